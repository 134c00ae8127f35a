use thiserror::Error;

/// Failures surfaced by a [`crate::store::Store`] and passed through the
/// lookup service untouched.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    #[error("invalid connection descriptor: {0}")]
    InvalidConnection(String),
    #[error("unsupported backend: {0}")]
    UnsupportedBackend(String),
    #[error("key must not be empty")]
    EmptyKey,
    #[error("key not found: {0}")]
    NotFound(String),
    #[error("backend unavailable: {0}")]
    Unavailable(String),
    #[error("backend timed out")]
    Timeout,
}

impl StoreError {
    /// Stable numeric code for external mapping/logging
    pub fn code(&self) -> u16 {
        match self {
            StoreError::InvalidConnection(_) => 2001,
            StoreError::UnsupportedBackend(_) => 2002,
            StoreError::EmptyKey => 2101,
            StoreError::NotFound(_) => 2102,
            StoreError::Unavailable(_) => 2201,
            StoreError::Timeout => 2202,
        }
    }

    pub fn not_found(key: &str) -> Self { Self::NotFound(key.to_string()) }
}
