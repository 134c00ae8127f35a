//! Lookup service layer.
//! - `store` defines the single `get` capability and its backends.
//! - `lookup` owns one store and forwards lookups to it.
//! - Errors from a backend reach the caller unchanged.

pub mod errors;
pub mod lookup;
pub mod store;

pub use errors::StoreError;
pub use lookup::LookupService;
pub use store::{Connection, Store};
