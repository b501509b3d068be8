//! Page guards for the customer and admin portals.
//!
//! SYSTEM CONTEXT
//! ==============
//! Both guards run synchronously on page load, before protected content is
//! shown. Neither may be installed on login or registration pages; see
//! `PortalConfig::is_public_page`.

pub mod admin;
pub mod gate;

pub use admin::{AdminAuthGate, AdminDenial};
pub use gate::AuthGate;
