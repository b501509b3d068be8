//! Session persistence over an injectable key-value backend.
//!
//! SYSTEM CONTEXT
//! ==============
//! Every component reads the session through `SessionStore`, never through
//! the backend directly. In the browser the backend is `localStorage`; in
//! tests and headless hosts it is `MemoryStore`.
//!
//! TRADE-OFFS
//! ==========
//! Change notification mirrors the browser's `storage` event: advisory and
//! fire-and-forget. `MemoryStore` notifies for every mutation, including the
//! caller's own, which only ever causes an extra idempotent re-render.

#[cfg(test)]
#[path = "store_test.rs"]
mod store_test;

use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::rc::{Rc, Weak};

use super::types::{Session, SessionLookup, classify};
use crate::config::PortalKind;

pub const AUTH_TOKEN_KEY: &str = "authToken";
pub const USER_KEY: &str = "user";
pub const REMEMBER_EMAIL_KEY: &str = "rememberEmail";
pub const REMEMBER_ADMIN_EMAIL_KEY: &str = "rememberAdminEmail";

/// Whether `key` is one of the two session fields.
pub fn is_session_key(key: &str) -> bool {
    key == AUTH_TOKEN_KEY || key == USER_KEY
}

// =============================================================================
// BACKEND
// =============================================================================

/// A single key-value mutation, as reported to subscribers.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StorageChange {
    /// Changed key; `None` when the whole store was cleared.
    pub key: Option<String>,
    pub new_value: Option<String>,
}

pub type ChangeListener = Rc<dyn Fn(&StorageChange)>;

/// Persistent string key-value storage with change notification.
pub trait KeyValueStore {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&self, key: &str, value: &str);
    fn remove(&self, key: &str);
    fn subscribe(&self, listener: ChangeListener) -> Subscription;
}

/// Handle for a change listener. Dropping it unsubscribes where the backend
/// supports that.
#[must_use = "dropping a Subscription unsubscribes the listener"]
pub struct Subscription {
    cancel: Option<Box<dyn FnOnce()>>,
}

impl Subscription {
    pub fn new(cancel: impl FnOnce() + 'static) -> Self {
        Self { cancel: Some(Box::new(cancel)) }
    }

    /// A subscription that lives as long as the page and cannot be cancelled.
    pub fn detached() -> Self {
        Self { cancel: None }
    }

    /// Keep the listener registered forever.
    pub fn forget(mut self) {
        self.cancel = None;
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(cancel) = self.cancel.take() {
            cancel();
        }
    }
}

impl std::fmt::Debug for Subscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscription")
            .field("cancellable", &self.cancel.is_some())
            .finish()
    }
}

/// In-process `KeyValueStore`. Clones share the same entries, so two clones
/// behave like two tabs of one origin.
#[derive(Clone, Default)]
pub struct MemoryStore {
    inner: Rc<MemoryInner>,
}

#[derive(Default)]
struct MemoryInner {
    entries: RefCell<HashMap<String, String>>,
    listeners: RefCell<Vec<(u64, ChangeListener)>>,
    next_listener_id: Cell<u64>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed entries without notifying listeners.
    pub fn with_entries<K, V>(entries: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        let store = Self::new();
        store
            .inner
            .entries
            .borrow_mut()
            .extend(entries.into_iter().map(|(k, v)| (k.into(), v.into())));
        store
    }

    pub fn len(&self) -> usize {
        self.inner.entries.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn listener_count(&self) -> usize {
        self.inner.listeners.borrow().len()
    }

    fn notify(&self, change: &StorageChange) {
        // Snapshot so listeners may subscribe or unsubscribe re-entrantly.
        let listeners: Vec<ChangeListener> = self
            .inner
            .listeners
            .borrow()
            .iter()
            .map(|(_, l)| Rc::clone(l))
            .collect();
        for listener in listeners {
            listener(change);
        }
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Option<String> {
        self.inner.entries.borrow().get(key).cloned()
    }

    fn set(&self, key: &str, value: &str) {
        self.inner
            .entries
            .borrow_mut()
            .insert(key.to_owned(), value.to_owned());
        self.notify(&StorageChange { key: Some(key.to_owned()), new_value: Some(value.to_owned()) });
    }

    fn remove(&self, key: &str) {
        let removed = self.inner.entries.borrow_mut().remove(key);
        if removed.is_some() {
            self.notify(&StorageChange { key: Some(key.to_owned()), new_value: None });
        }
    }

    fn subscribe(&self, listener: ChangeListener) -> Subscription {
        let id = self.inner.next_listener_id.get();
        self.inner.next_listener_id.set(id + 1);
        self.inner.listeners.borrow_mut().push((id, listener));

        let weak: Weak<MemoryInner> = Rc::downgrade(&self.inner);
        Subscription::new(move || {
            if let Some(inner) = weak.upgrade() {
                inner
                    .listeners
                    .borrow_mut()
                    .retain(|(listener_id, _)| *listener_id != id);
            }
        })
    }
}

// =============================================================================
// SESSION STORE
// =============================================================================

/// Reads and writes the `authToken`/`user` pair.
#[derive(Clone)]
pub struct SessionStore {
    backend: Rc<dyn KeyValueStore>,
}

impl SessionStore {
    pub fn new(backend: Rc<dyn KeyValueStore>) -> Self {
        Self { backend }
    }

    /// Current session, or `None` when absent or unreadable. Never fails.
    pub fn get(&self) -> Option<Session> {
        self.lookup().into_session()
    }

    pub fn lookup(&self) -> SessionLookup {
        let token = self.backend.get(AUTH_TOKEN_KEY);
        let user = self.backend.get(USER_KEY);
        let lookup = classify(token.as_deref(), user.as_deref());
        if lookup == SessionLookup::Malformed {
            tracing::warn!("persisted user record is not a valid object");
        }
        lookup
    }

    pub fn is_authenticated(&self) -> bool {
        self.get().is_some()
    }

    pub fn token(&self) -> Option<String> {
        self.get().map(|session| session.token)
    }

    /// Persist both fields.
    pub fn set(&self, session: &Session) {
        let user = match serde_json::to_string(&session.user) {
            Ok(user) => user,
            Err(e) => {
                tracing::warn!(error = %e, "failed to encode user record; session not stored");
                return;
            }
        };
        self.backend.set(AUTH_TOKEN_KEY, &session.token);
        self.backend.set(USER_KEY, &user);
    }

    /// Remove both fields.
    pub fn clear(&self) {
        self.backend.remove(AUTH_TOKEN_KEY);
        self.backend.remove(USER_KEY);
    }

    pub fn remember_email(&self, kind: PortalKind, email: &str) {
        self.backend.set(kind.remember_email_key(), email);
    }

    pub fn remembered_email(&self, kind: PortalKind) -> Option<String> {
        self.backend
            .get(kind.remember_email_key())
            .filter(|email| !email.is_empty())
    }

    pub fn forget_remembered_email(&self, kind: PortalKind) {
        self.backend.remove(kind.remember_email_key());
    }

    /// Listen for changes to the session fields only.
    pub fn subscribe(&self, listener: impl Fn(&StorageChange) + 'static) -> Subscription {
        self.backend.subscribe(Rc::new(move |change: &StorageChange| {
            let relevant = change.key.as_deref().map_or(true, is_session_key);
            if relevant {
                listener(change);
            }
        }))
    }
}

impl std::fmt::Debug for SessionStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionStore").finish_non_exhaustive()
    }
}
