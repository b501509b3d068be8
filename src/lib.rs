//! # storefront-session
//!
//! Client-side session glue for the food-ordering storefront's customer and
//! admin portals.
//!
//! The crate keeps two persisted fields (`authToken`, `user`) and reflects
//! them into the page: page guards redirect signed-out visitors, the navbar
//! re-renders on every session change, and the REST client attaches the
//! bearer token and ends the session on `401`.
//!
//! Storage, navigation, the document and HTTP are all injected, so the same
//! components run against the browser (`hydrate` feature, see [`browser`])
//! or against in-memory doubles on native hosts.

pub mod auth;
#[cfg(feature = "hydrate")]
pub mod browser;
pub mod config;
pub mod dom;
#[cfg(not(target_arch = "wasm32"))]
pub mod logging;
pub mod nav;
pub mod navbar;
pub mod net;
pub mod session;

pub use auth::{AdminAuthGate, AdminDenial, AuthGate};
pub use config::{PortalConfig, PortalKind};
pub use navbar::NavbarReflector;
pub use net::{AuthClient, FetchError, FetchOutcome};
pub use session::{Session, SessionStore, SessionUser};

#[cfg(test)]
#[path = "lib_test.rs"]
mod tests;
