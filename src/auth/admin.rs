//! Admin portal guard and sidebar identity.
//!
//! SYSTEM CONTEXT
//! ==============
//! Admin pages are stricter than customer pages: the stored user must carry
//! `userType == "admin"`, and any failure tears the session down before
//! redirecting to the admin login page.
//!
//! TRADE-OFFS
//! ==========
//! There is no push notification when another tab (or the server) ends the
//! session, so `install` re-runs the check whenever the tab becomes visible
//! again. Staleness is bounded by the next refocus, not eliminated.

#[cfg(test)]
#[path = "admin_test.rs"]
mod admin_test;

use std::rc::Rc;

use crate::config::{PortalConfig, PortalKind};
use crate::dom::Document;
use crate::nav::Navigator;
use crate::session::{Session, SessionLookup, SessionStore, SessionUser};

pub const SIDEBAR_NAME_SELECTORS: [&str; 2] = [".sidebar-user-name", "#adminName"];
pub const SIDEBAR_EMAIL_SELECTORS: [&str; 2] = [".sidebar-user-email", "#adminEmail"];
pub const ADMIN_LOGOUT_SELECTOR: &str = "#adminLogoutBtn";

/// Why the admin gate refused a page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum AdminDenial {
    #[error("no admin session")]
    NoSession,
    #[error("stored admin record is unreadable")]
    MalformedUser,
    #[error("signed-in user is not an admin")]
    NotAdmin,
}

/// Decide whether a lookup grants admin access.
///
/// # Errors
///
/// Returns the denial kind for absent, malformed, or non-admin sessions.
pub fn check_admin(lookup: SessionLookup) -> Result<Session, AdminDenial> {
    match lookup {
        SessionLookup::Present(session) if session.user.is_admin() => Ok(session),
        SessionLookup::Present(_) => Err(AdminDenial::NotAdmin),
        SessionLookup::Absent => Err(AdminDenial::NoSession),
        SessionLookup::Malformed => Err(AdminDenial::MalformedUser),
    }
}

pub struct AdminAuthGate {
    sessions: SessionStore,
    navigator: Rc<dyn Navigator>,
    document: Rc<dyn Document>,
    login_url: String,
}

impl AdminAuthGate {
    pub fn new(
        sessions: SessionStore,
        navigator: Rc<dyn Navigator>,
        document: Rc<dyn Document>,
        config: &PortalConfig,
    ) -> Self {
        Self { sessions, navigator, document, login_url: config.login_url_for(PortalKind::Admin) }
    }

    /// Read-only decision; never touches storage or the page.
    ///
    /// # Errors
    ///
    /// Returns the denial kind when the page must not render.
    pub fn check(&self) -> Result<Session, AdminDenial> {
        check_admin(self.sessions.lookup())
    }

    /// Returns `true` for an admin session and fills the sidebar. On any
    /// denial, clears the session, redirects to the admin login page and
    /// returns `false`.
    pub fn enforce(&self) -> bool {
        match self.check() {
            Ok(session) => {
                self.fill_sidebar(&session.user);
                true
            }
            Err(denial) => {
                match denial {
                    AdminDenial::NoSession => tracing::debug!("no admin session; redirecting"),
                    AdminDenial::MalformedUser | AdminDenial::NotAdmin => {
                        tracing::warn!(%denial, "admin gate denied access");
                    }
                }
                self.sessions.clear();
                self.navigator.navigate(&self.login_url);
                false
            }
        }
    }

    /// Run `enforce` now and again every time the page becomes visible, and
    /// wire the sidebar logout button.
    pub fn install(self: &Rc<Self>) -> bool {
        let weak = Rc::downgrade(self);
        self.document.on_visibility_change(Rc::new(move |visible: bool| {
            if !visible {
                return;
            }
            if let Some(gate) = weak.upgrade() {
                gate.enforce();
            }
        }));

        let weak = Rc::downgrade(self);
        self.document.on_click(
            ADMIN_LOGOUT_SELECTOR,
            Rc::new(move || {
                if let Some(gate) = weak.upgrade() {
                    gate.logout();
                }
            }),
        );

        self.enforce()
    }

    /// End the admin session and return to the admin login page.
    pub fn logout(&self) {
        tracing::info!("admin logout");
        self.sessions.clear();
        self.sessions.forget_remembered_email(PortalKind::Admin);
        self.navigator.navigate(&self.login_url);
    }

    fn fill_sidebar(&self, user: &SessionUser) {
        let name = user.display_name();
        for selector in SIDEBAR_NAME_SELECTORS {
            self.document.set_text(selector, &name);
        }
        if let Some(email) = user.email.as_deref() {
            for selector in SIDEBAR_EMAIL_SELECTORS {
                self.document.set_text(selector, email);
            }
        }
    }
}
