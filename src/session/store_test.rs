use super::*;
use crate::session::types::SessionUser;

// =============================================================
// Helpers
// =============================================================

fn ana() -> Session {
    Session::new(
        "abc",
        SessionUser {
            first_name: Some("Ana".to_owned()),
            user_type: Some("customer".to_owned()),
            ..SessionUser::default()
        },
    )
}

fn store_over(backend: &MemoryStore) -> SessionStore {
    SessionStore::new(Rc::new(backend.clone()))
}

// =============================================================
// MemoryStore
// =============================================================

#[test]
fn memory_store_get_set_remove() {
    let store = MemoryStore::new();
    assert!(store.get("k").is_none());
    store.set("k", "v");
    assert_eq!(store.get("k").as_deref(), Some("v"));
    store.remove("k");
    assert!(store.get("k").is_none());
    assert!(store.is_empty());
}

#[test]
fn memory_store_clones_share_entries() {
    let tab_a = MemoryStore::new();
    let tab_b = tab_a.clone();
    tab_a.set("k", "v");
    assert_eq!(tab_b.get("k").as_deref(), Some("v"));
}

#[test]
fn memory_store_notifies_subscribers() {
    let store = MemoryStore::new();
    let seen = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&seen);
    let _sub = store.subscribe(Rc::new(move |change: &StorageChange| sink.borrow_mut().push(change.clone())));

    store.set("k", "v");
    store.remove("k");
    store.remove("missing");

    let seen = seen.borrow();
    assert_eq!(seen.len(), 2);
    assert_eq!(seen[0], StorageChange { key: Some("k".to_owned()), new_value: Some("v".to_owned()) });
    assert_eq!(seen[1], StorageChange { key: Some("k".to_owned()), new_value: None });
}

#[test]
fn dropping_subscription_unsubscribes() {
    let store = MemoryStore::new();
    let hits = Rc::new(Cell::new(0));
    let counter = Rc::clone(&hits);
    let sub = store.subscribe(Rc::new(move |_: &StorageChange| counter.set(counter.get() + 1)));
    assert_eq!(store.listener_count(), 1);

    store.set("k", "1");
    drop(sub);
    store.set("k", "2");

    assert_eq!(hits.get(), 1);
    assert_eq!(store.listener_count(), 0);
}

#[test]
fn forgotten_subscription_stays_registered() {
    let store = MemoryStore::new();
    store
        .subscribe(Rc::new(|_: &StorageChange| {}))
        .forget();
    assert_eq!(store.listener_count(), 1);
}

#[test]
fn listener_may_subscribe_reentrantly() {
    let store = MemoryStore::new();
    let inner_store = store.clone();
    let _sub = store.subscribe(Rc::new(move |_: &StorageChange| {
        inner_store
            .subscribe(Rc::new(|_: &StorageChange| {}))
            .forget();
    }));
    store.set("k", "v");
    assert_eq!(store.listener_count(), 2);
}

// =============================================================
// SessionStore
// =============================================================

#[test]
fn set_then_get_returns_session() {
    let backend = MemoryStore::new();
    let sessions = store_over(&backend);
    sessions.set(&ana());

    assert_eq!(sessions.get(), Some(ana()));
    assert_eq!(backend.get(AUTH_TOKEN_KEY).as_deref(), Some("abc"));
    let user: serde_json::Value = serde_json::from_str(&backend.get(USER_KEY).unwrap()).unwrap();
    assert_eq!(user["firstName"], "Ana");
}

#[test]
fn clear_removes_both_fields() {
    let backend = MemoryStore::new();
    let sessions = store_over(&backend);
    sessions.set(&ana());
    sessions.clear();

    assert!(sessions.get().is_none());
    assert!(!sessions.is_authenticated());
    assert!(backend.get(AUTH_TOKEN_KEY).is_none());
    assert!(backend.get(USER_KEY).is_none());
}

#[test]
fn token_alone_is_not_a_session() {
    let backend = MemoryStore::with_entries([(AUTH_TOKEN_KEY, "abc")]);
    assert!(store_over(&backend).get().is_none());
}

#[test]
fn user_alone_is_not_a_session() {
    let backend = MemoryStore::with_entries([(USER_KEY, r#"{"firstName":"Ana"}"#)]);
    assert!(store_over(&backend).get().is_none());
}

#[test]
fn malformed_user_fails_open() {
    let backend = MemoryStore::with_entries([(AUTH_TOKEN_KEY, "abc"), (USER_KEY, "{oops")]);
    let sessions = store_over(&backend);
    assert!(sessions.get().is_none());
    assert_eq!(sessions.lookup(), SessionLookup::Malformed);
}

#[test]
fn token_reads_current_token() {
    let backend = MemoryStore::new();
    let sessions = store_over(&backend);
    assert!(sessions.token().is_none());
    sessions.set(&ana());
    assert_eq!(sessions.token().as_deref(), Some("abc"));
}

#[test]
fn remembered_email_is_per_portal() {
    let backend = MemoryStore::new();
    let sessions = store_over(&backend);
    sessions.remember_email(PortalKind::Customer, "ana@example.com");
    sessions.remember_email(PortalKind::Admin, "root@example.com");

    assert_eq!(backend.get(REMEMBER_EMAIL_KEY).as_deref(), Some("ana@example.com"));
    assert_eq!(backend.get(REMEMBER_ADMIN_EMAIL_KEY).as_deref(), Some("root@example.com"));

    sessions.forget_remembered_email(PortalKind::Customer);
    assert!(sessions.remembered_email(PortalKind::Customer).is_none());
    assert_eq!(sessions.remembered_email(PortalKind::Admin).as_deref(), Some("root@example.com"));
}

#[test]
fn clear_keeps_remembered_email() {
    let backend = MemoryStore::new();
    let sessions = store_over(&backend);
    sessions.set(&ana());
    sessions.remember_email(PortalKind::Customer, "ana@example.com");
    sessions.clear();
    assert_eq!(sessions.remembered_email(PortalKind::Customer).as_deref(), Some("ana@example.com"));
}

#[test]
fn subscribe_filters_to_session_keys() {
    let backend = MemoryStore::new();
    let sessions = store_over(&backend);
    let hits = Rc::new(Cell::new(0));
    let counter = Rc::clone(&hits);
    let _sub = sessions.subscribe(move |_| counter.set(counter.get() + 1));

    backend.set("theme", "dark");
    backend.set(REMEMBER_EMAIL_KEY, "ana@example.com");
    assert_eq!(hits.get(), 0);

    sessions.set(&ana());
    assert_eq!(hits.get(), 2);
}

#[test]
fn session_key_predicate() {
    assert!(is_session_key("authToken"));
    assert!(is_session_key("user"));
    assert!(!is_session_key("rememberEmail"));
}
