//! Networking for the storefront REST API.
//!
//! SYSTEM CONTEXT
//! ==============
//! `client` owns the session rules (bearer header, signed-out short circuit,
//! `401` teardown), `transport` moves bytes, and `types` defines the shared
//! request/response shapes.

pub mod client;
pub mod transport;
pub mod types;

pub use client::{AuthClient, Credentials};
pub use transport::HttpTransport;
#[cfg(not(target_arch = "wasm32"))]
pub use transport::ReqwestTransport;
pub use types::{ApiRequest, ApiResponse, FetchError, FetchOutcome, Method, RequestOptions};
