use std::net::SocketAddr;
use std::time::Duration;

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use service::StoreError;
use thiserror::Error;
use tracing::error;

/// Request-level failure; wraps the store error the lookup service returned.
#[derive(Debug)]
pub struct ApiError(pub StoreError);

impl From<StoreError> for ApiError {
    fn from(e: StoreError) -> Self { Self(e) }
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match &self.0 {
            StoreError::EmptyKey => StatusCode::BAD_REQUEST,
            StoreError::NotFound(_) => StatusCode::NOT_FOUND,
            StoreError::Unavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            StoreError::Timeout => StatusCode::GATEWAY_TIMEOUT,
            StoreError::InvalidConnection(_) | StoreError::UnsupportedBackend(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            error!(error = %self.0, code = self.0.code(), "lookup failed");
        }
        let body = serde_json::json!({"error": self.0.to_string(), "code": self.0.code()});
        (status, Json(body)).into_response()
    }
}

/// Listener lifecycle failures.
#[derive(Debug, Error)]
pub enum ServerError {
    #[error("address already in use: {0}")]
    AddrInUse(SocketAddr),
    #[error("cannot bind {addr}: {source}")]
    Bind {
        addr: SocketAddr,
        #[source]
        source: std::io::Error,
    },
    #[error("server already started")]
    AlreadyStarted,
    #[error("in-flight requests still running after {0:?}; forced shutdown")]
    DrainTimeout(Duration),
    #[error("serve loop failed: {0}")]
    Serve(String),
}

#[derive(Debug, Error)]
pub enum StartupError {
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
    #[error("store construction failed: {0}")]
    Store(#[source] StoreError),
    #[error("startup diagnostic lookup failed: {0}")]
    Diagnostic(#[source] StoreError),
    #[error(transparent)]
    Server(#[from] ServerError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn store_errors_map_to_statuses() {
        let cases = [
            (StoreError::EmptyKey, StatusCode::BAD_REQUEST),
            (StoreError::not_found("k"), StatusCode::NOT_FOUND),
            (StoreError::Unavailable("down".into()), StatusCode::SERVICE_UNAVAILABLE),
            (StoreError::Timeout, StatusCode::GATEWAY_TIMEOUT),
            (StoreError::UnsupportedBackend("x".into()), StatusCode::INTERNAL_SERVER_ERROR),
        ];
        for (err, status) in cases {
            assert_eq!(ApiError(err).into_response().status(), status);
        }
    }
}
