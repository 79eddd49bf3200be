use std::sync::Arc;

use axum::{Json, Router, extract::State, routing::get};
use serde::Serialize;

use crate::ApiState;

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    data_dir_ok: bool,
    tenants: usize,
}

#[derive(Serialize)]
struct VersionResponse {
    name: &'static str,
    version: &'static str,
}

/// Liveness plus a cheap check that the data directory is still reachable.
async fn health_check(State(state): State<Arc<ApiState>>) -> Json<HealthResponse> {
    let data_dir_ok = tokio::fs::metadata(state.store.layout().root())
        .await
        .map(|m| m.is_dir())
        .unwrap_or(false);
    Json(HealthResponse {
        status: if data_dir_ok { "ok" } else { "degraded" },
        data_dir_ok,
        tenants: state.registry.list().await.len(),
    })
}

async fn version() -> Json<VersionResponse> {
    Json(VersionResponse {
        name: env!("CARGO_PKG_NAME"),
        version: env!("CARGO_PKG_VERSION"),
    })
}

pub fn routes() -> Router<Arc<ApiState>> {
    Router::new()
        .route("/health", get(health_check))
        .route("/version", get(version))
}
