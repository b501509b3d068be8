//! Page-level flows across the gate, navbar and client sharing one store.

use std::cell::RefCell;
use std::rc::Rc;

use super::*;
use crate::dom::{Document, ElementSpec, StubDocument};
use crate::nav::RecordingNavigator;
use crate::net::{ApiRequest, ApiResponse, HttpTransport, RequestOptions};
use crate::session::store::{AUTH_TOKEN_KEY, USER_KEY};
use crate::session::{KeyValueStore, MemoryStore};

#[derive(Clone, Default)]
struct FixedStatus {
    status: u16,
    calls: Rc<RefCell<usize>>,
}

#[async_trait::async_trait(?Send)]
impl HttpTransport for FixedStatus {
    async fn send(&self, _request: ApiRequest) -> Result<ApiResponse, FetchError> {
        *self.calls.borrow_mut() += 1;
        Ok(ApiResponse::new(self.status, "{}"))
    }
}

fn orders_page() -> StubDocument {
    let doc = StubDocument::new();
    doc.append_child("body", &ElementSpec::new("nav").class("navbar"));
    doc.append_child(".navbar", &ElementSpec::new("div").class("navbar-actions"));
    doc.append_child(".navbar", &ElementSpec::new("a").id("ordersIcon"));
    doc
}

#[tokio::test]
async fn customer_page_load_then_expired_token() {
    let backend = MemoryStore::with_entries([
        (AUTH_TOKEN_KEY, "abc"),
        (USER_KEY, r#"{"firstName":"Ana","userType":"customer"}"#),
    ]);
    let sessions = SessionStore::new(Rc::new(backend.clone()));
    let nav = RecordingNavigator::new();
    let doc = Rc::new(orders_page());
    let config = PortalConfig::default();

    // Page load: gate, then navbar.
    assert!(AuthGate::new(sessions.clone(), Rc::new(nav.clone()), &config).enforce(true));
    let navbar = Rc::new(NavbarReflector::new(
        sessions.clone(),
        Rc::new(nav.clone()),
        doc.clone(),
        config.clone(),
    ));
    let _sub = navbar.install();
    assert_eq!(doc.text(".nav-greeting").as_deref(), Some("Welcome, Ana!"));
    assert_eq!(doc.count("#logoutBtn"), 1);

    // The server has expired the token.
    let transport = FixedStatus { status: 401, ..FixedStatus::default() };
    let client = AuthClient::new(transport.clone(), sessions.clone(), Rc::new(nav.clone()), config, PortalKind::Customer);
    let outcome = client.request("/orders", RequestOptions::get()).await.unwrap();

    assert!(matches!(outcome, FetchOutcome::Unauthorized(ref r) if r.status == 401));
    assert!(backend.is_empty());
    assert_eq!(nav.visited(), vec!["login.html".to_owned()]);
    assert_eq!(doc.count(".btn-login"), 1);
    assert_eq!(doc.is_hidden("#ordersIcon"), Some(true));

    // Any further request short-circuits without touching the network.
    let again = client.request("/orders", RequestOptions::get()).await.unwrap();
    assert_eq!(again, FetchOutcome::SignedOut);
    assert_eq!(*transport.calls.borrow(), 1);
}

#[test]
fn signed_out_visitor_is_sent_to_login() {
    let sessions = SessionStore::new(Rc::new(MemoryStore::new()));
    let nav = RecordingNavigator::new();
    let gate = AuthGate::new(sessions, Rc::new(nav.clone()), &PortalConfig::for_depth(1));
    assert!(!gate.enforce(true));
    assert_eq!(nav.visited(), vec!["../login.html".to_owned()]);
}

#[test]
fn customer_session_on_admin_page_is_torn_down() {
    let backend = MemoryStore::with_entries([(AUTH_TOKEN_KEY, "abc"), (USER_KEY, r#"{"userType":"customer"}"#)]);
    let nav = RecordingNavigator::new();
    let gate = AdminAuthGate::new(
        SessionStore::new(Rc::new(backend.clone())),
        Rc::new(nav.clone()),
        Rc::new(StubDocument::new()),
        &PortalConfig::default(),
    );
    assert!(!gate.enforce());
    assert!(backend.get(AUTH_TOKEN_KEY).is_none());
    assert_eq!(nav.visited(), vec!["admin/login.html".to_owned()]);
}
