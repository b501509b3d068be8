//! Customer page guard.
//!
//! SYSTEM CONTEXT
//! ==============
//! Protected pages call `enforce` before rendering anything. The check is a
//! single synchronous storage read; expiry is only discovered later when the
//! server answers `401` (see `net::client`).

#[cfg(test)]
#[path = "gate_test.rs"]
mod gate_test;

use std::rc::Rc;

use crate::config::PortalConfig;
use crate::nav::Navigator;
use crate::session::{SessionLookup, SessionStore};

/// Whether a lookup should let a protected page render.
pub fn is_signed_in(lookup: &SessionLookup) -> bool {
    matches!(lookup, SessionLookup::Present(_))
}

pub struct AuthGate {
    sessions: SessionStore,
    navigator: Rc<dyn Navigator>,
    login_url: String,
}

impl AuthGate {
    pub fn new(sessions: SessionStore, navigator: Rc<dyn Navigator>, config: &PortalConfig) -> Self {
        Self { sessions, navigator, login_url: config.login_url() }
    }

    /// Returns `true` when a session is present. Otherwise returns `false`
    /// and, if `redirect` is set, navigates to the login page.
    ///
    /// An unreadable user record is cleared before returning.
    pub fn enforce(&self, redirect: bool) -> bool {
        let lookup = self.sessions.lookup();
        if is_signed_in(&lookup) {
            return true;
        }
        if lookup == SessionLookup::Malformed {
            self.sessions.clear();
        }
        if redirect {
            tracing::debug!(login_url = %self.login_url, "no session; redirecting to login");
            self.navigator.navigate(&self.login_url);
        }
        false
    }

    pub fn enforce_or_redirect(&self) -> bool {
        self.enforce(true)
    }
}
