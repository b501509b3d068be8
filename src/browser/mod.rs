//! Browser bindings and page entry points (`hydrate` feature).
//!
//! SYSTEM CONTEXT
//! ==============
//! Each storefront page calls exactly one `mount_*` function from its
//! bootstrap script. Mounting wires the browser implementations of the
//! storage, navigation, document and transport seams into the same
//! components the native build tests against.

mod document;
mod storage;
mod transport;

use std::rc::Rc;

use wasm_bindgen::prelude::*;

pub use document::BrowserDocument;
pub use storage::{BrowserNavigator, LocalStorage};
pub use transport::BrowserTransport;

use crate::auth::{AdminAuthGate, AuthGate};
use crate::config::{PortalConfig, PortalKind};
use crate::nav::Navigator;
use crate::navbar::NavbarReflector;
use crate::net::AuthClient;
use crate::session::SessionStore;

fn init_console() {
    console_error_panic_hook::set_once();
    let _ = console_log::init_with_level(log::Level::Debug);
}

fn current_path() -> String {
    web_sys::window()
        .and_then(|w| w.location().pathname().ok())
        .unwrap_or_default()
}

pub fn session_store() -> SessionStore {
    SessionStore::new(Rc::new(LocalStorage))
}

/// Authenticated client for page code on the given portal.
pub fn auth_client(config: PortalConfig, kind: PortalKind) -> AuthClient<BrowserTransport> {
    AuthClient::new(BrowserTransport, session_store(), Rc::new(BrowserNavigator), config, kind)
}

/// Mount the customer session glue on a storefront page.
///
/// On `protected` pages the auth gate runs first; returns `false` when it
/// redirected. Login and registration pages are never gated.
#[wasm_bindgen]
pub fn mount_storefront(page_depth: u32, protected: bool) -> bool {
    init_console();
    let config = PortalConfig::for_depth(page_depth);
    let sessions = session_store();
    let navigator: Rc<dyn Navigator> = Rc::new(BrowserNavigator);

    let gated = protected && !config.is_public_page(&current_path());
    if gated && !AuthGate::new(sessions.clone(), Rc::clone(&navigator), &config).enforce(true) {
        return false;
    }

    if let Some(document) = BrowserDocument::current() {
        let navbar = Rc::new(NavbarReflector::new(sessions, navigator, Rc::new(document), config));
        navbar.install().forget();
        // The navbar lives for the rest of the page.
        std::mem::forget(navbar);
    }
    true
}

/// Mount the admin gate and sidebar on an admin page.
#[wasm_bindgen]
pub fn mount_admin(page_depth: u32) -> bool {
    init_console();
    let config = PortalConfig::for_depth(page_depth);
    if config.is_public_page(&current_path()) {
        return true;
    }
    let Some(document) = BrowserDocument::current() else {
        return false;
    };
    let gate = Rc::new(AdminAuthGate::new(
        session_store(),
        Rc::new(BrowserNavigator),
        Rc::new(document),
        &config,
    ));
    let allowed = gate.install();
    std::mem::forget(gate);
    allowed
}
