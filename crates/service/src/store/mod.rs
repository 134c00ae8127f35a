//! The store capability and its backends.
//!
//! A store is shared across request tasks behind an `Arc`, so a networked
//! backend must synchronise or pool its connections internally.

use std::fmt;

use async_trait::async_trait;

use crate::errors::StoreError;

pub mod mock;
pub mod mysql;

pub use mysql::MysqlStore;

/// Data-access capability: resolve a key to a value.
#[async_trait]
pub trait Store: Send + Sync {
    async fn get(&self, key: &str) -> Result<String, StoreError>;
}

/// Opaque descriptor naming the backend target, e.g. `mysql` or
/// `mysql://user:pass@db:3306/app`.
#[derive(Clone, PartialEq, Eq)]
pub struct Connection(String);

impl Connection {
    pub fn parse(raw: &str) -> Result<Self, StoreError> {
        let raw = raw.trim();
        if raw.is_empty() {
            return Err(StoreError::InvalidConnection("descriptor is empty".into()));
        }
        Ok(Self(raw.to_string()))
    }

    /// Scheme part of the descriptor, or the whole token when there is none.
    pub fn backend(&self) -> &str {
        match self.0.split_once("://") {
            Some((scheme, _)) => scheme,
            None => &self.0,
        }
    }

    pub fn as_str(&self) -> &str { &self.0 }
}

// Only the backend is shown; the rest may carry credentials.
impl fmt::Display for Connection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.backend())
    }
}

impl fmt::Debug for Connection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Connection").field(&self.backend()).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_descriptor_is_invalid() {
        assert!(matches!(Connection::parse(""), Err(StoreError::InvalidConnection(_))));
        assert!(matches!(Connection::parse("  \t"), Err(StoreError::InvalidConnection(_))));
    }

    #[test]
    fn backend_is_scheme_or_token() {
        assert_eq!(Connection::parse("mysql").unwrap().backend(), "mysql");
        assert_eq!(Connection::parse(" mysql ").unwrap().as_str(), "mysql");
        let url = Connection::parse("mysql://root:secret@db:3306/app").unwrap();
        assert_eq!(url.backend(), "mysql");
    }

    #[test]
    fn display_hides_credentials() {
        let url = Connection::parse("mysql://root:secret@db:3306/app").unwrap();
        assert_eq!(url.to_string(), "mysql");
        assert!(!format!("{url:?}").contains("secret"));
    }
}
