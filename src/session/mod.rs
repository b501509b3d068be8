//! Session persistence and schema.
//!
//! SYSTEM CONTEXT
//! ==============
//! `types` holds the persisted schema and the pure lookup taxonomy, `store`
//! binds it to a key-value backend.

pub mod store;
pub mod types;

pub use store::{KeyValueStore, MemoryStore, SessionStore, StorageChange, Subscription};
pub use types::{Session, SessionLookup, SessionUser};
