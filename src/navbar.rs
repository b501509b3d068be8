//! Navbar auth section reflector.
//!
//! SYSTEM CONTEXT
//! ==============
//! The navbar holds no state of its own: every render reads the session and
//! rebuilds `#authLinks` from scratch. It re-renders on page load and on
//! every storage change to the session fields, which is how a login or
//! logout in another tab shows up here.

#[cfg(test)]
#[path = "navbar_test.rs"]
mod navbar_test;

use std::rc::Rc;

use crate::config::{PortalConfig, PortalKind};
use crate::dom::{Document, ElementSpec};
use crate::nav::Navigator;
use crate::session::{SessionStore, SessionUser, Subscription};

pub const NAVBAR_CONTAINER_SELECTORS: [&str; 2] = [".navbar-actions", ".navbar-links"];
pub const AUTH_LINKS_ID: &str = "authLinks";
pub const AUTH_LINKS_SELECTOR: &str = "#authLinks";
pub const ORDERS_ICON_SELECTOR: &str = "#ordersIcon";
pub const LOGOUT_BUTTON_ID: &str = "logoutBtn";
pub const LOGOUT_BUTTON_SELECTOR: &str = "#logoutBtn";

/// What the auth section should show.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum NavbarView {
    SignedIn { greeting: String },
    SignedOut { login_url: String, register_url: String },
}

impl NavbarView {
    pub fn for_user(user: Option<&SessionUser>, config: &PortalConfig) -> Self {
        match user {
            Some(user) => Self::SignedIn { greeting: greeting(user) },
            None => Self::SignedOut { login_url: config.login_url(), register_url: config.register_url() },
        }
    }

    fn elements(&self) -> Vec<ElementSpec> {
        match self {
            Self::SignedIn { greeting } => vec![
                ElementSpec::new("span").class("nav-greeting").text(greeting.as_str()),
                ElementSpec::new("button")
                    .id(LOGOUT_BUTTON_ID)
                    .class("btn btn-logout")
                    .text("Logout"),
            ],
            Self::SignedOut { login_url, register_url } => vec![
                ElementSpec::new("a")
                    .class("btn btn-login")
                    .href(login_url.as_str())
                    .text("Login"),
                ElementSpec::new("a")
                    .class("btn btn-signup")
                    .href(register_url.as_str())
                    .text("Sign Up"),
            ],
        }
    }
}

pub fn greeting(user: &SessionUser) -> String {
    format!("Welcome, {}!", user.greeting_name())
}

pub struct NavbarReflector {
    sessions: SessionStore,
    navigator: Rc<dyn Navigator>,
    document: Rc<dyn Document>,
    config: PortalConfig,
}

impl NavbarReflector {
    pub fn new(
        sessions: SessionStore,
        navigator: Rc<dyn Navigator>,
        document: Rc<dyn Document>,
        config: PortalConfig,
    ) -> Self {
        Self { sessions, navigator, document, config }
    }

    /// Rebuild the auth section from the current session. Idempotent.
    pub fn render(self: &Rc<Self>) {
        let Some(container) = self.ensure_container() else {
            tracing::debug!("navbar container not found; skipping render");
            return;
        };
        let session = self.sessions.get();
        let view = NavbarView::for_user(session.as_ref().map(|s| &s.user), &self.config);

        self.document.clear_children(container);
        for element in view.elements() {
            self.document.append_child(container, &element);
        }
        let signed_in = matches!(view, NavbarView::SignedIn { .. });
        self.document.set_hidden(ORDERS_ICON_SELECTOR, !signed_in);

        if signed_in {
            let weak = Rc::downgrade(self);
            self.document.on_click(
                LOGOUT_BUTTON_SELECTOR,
                Rc::new(move || {
                    if let Some(navbar) = weak.upgrade() {
                        navbar.logout();
                    }
                }),
            );
        }
        tracing::debug!(signed_in, "navbar rendered");
    }

    /// Render now and re-render on every session change.
    pub fn install(self: &Rc<Self>) -> Subscription {
        self.render();
        let weak = Rc::downgrade(self);
        self.sessions.subscribe(move |_| {
            if let Some(navbar) = weak.upgrade() {
                navbar.render();
            }
        })
    }

    /// Clear the session and remembered email, then go to the home page.
    pub fn logout(&self) {
        tracing::info!("customer logout");
        self.sessions.clear();
        self.sessions.forget_remembered_email(PortalKind::Customer);
        self.navigator.navigate(&self.config.home_url());
    }

    fn ensure_container(&self) -> Option<&'static str> {
        if self.document.exists(AUTH_LINKS_SELECTOR) {
            return Some(AUTH_LINKS_SELECTOR);
        }
        let created = NAVBAR_CONTAINER_SELECTORS.into_iter().any(|parent| {
            self.document
                .append_child(parent, &ElementSpec::new("div").id(AUTH_LINKS_ID).class("auth-links"))
        });
        created.then_some(AUTH_LINKS_SELECTOR)
    }
}
