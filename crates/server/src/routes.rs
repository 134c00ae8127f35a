use std::sync::Arc;

use axum::{
    extract::{Path, State},
    routing::get,
    Json, Router,
};
use tower_http::{
    catch_panic::CatchPanicLayer,
    trace::{DefaultMakeSpan, DefaultOnFailure, DefaultOnRequest, DefaultOnResponse, TraceLayer},
};
use tracing::Level;

use common::types::{Health, LookupResponse, Pong};
use service::{LookupService, Store};

use crate::errors::ApiError;

/// Router state: the lookup service the endpoints are bound to.
pub struct AppState<S: Store> {
    pub lookup: Arc<LookupService<S>>,
}

impl<S: Store> Clone for AppState<S> {
    fn clone(&self) -> Self {
        Self { lookup: Arc::clone(&self.lookup) }
    }
}

pub async fn ping() -> Json<Pong> {
    Json(Pong::default())
}

pub async fn health() -> Json<Health> {
    Json(Health { status: "ok" })
}

async fn lookup<S: Store + 'static>(
    State(state): State<AppState<S>>,
    Path(key): Path<String>,
) -> Result<Json<LookupResponse>, ApiError> {
    let value = state.lookup.lookup(&key).await?;
    Ok(Json(LookupResponse { key, value }))
}

/// Build the application router bound to `service`.
pub fn build_router<S: Store + 'static>(service: Arc<LookupService<S>>) -> Router {
    Router::new()
        .route("/ping", get(ping))
        .route("/health", get(health))
        .route("/lookup/:key", get(lookup::<S>))
        .with_state(AppState { lookup: service })
        // 处理器 panic 时返回 500，监听进程保持运行
        .layer(CatchPanicLayer::new())
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(
                    DefaultMakeSpan::new()
                        .level(Level::INFO)
                        .include_headers(false),
                )
                .on_request(DefaultOnRequest::new().level(Level::INFO))
                .on_response(
                    DefaultOnResponse::new()
                        .level(Level::INFO)
                        .include_headers(false),
                )
                .on_failure(DefaultOnFailure::new().level(Level::ERROR)),
        )
}
