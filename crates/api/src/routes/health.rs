//! Health check route.

use axum::routing::get;
use axum::{Json, Router};
use serde_json::json;

use crate::state::AppState;

/// ```text
/// GET    /health               liveness probe
/// ```
pub fn router() -> Router<AppState> {
    Router::new().route("/health", get(health))
}

/// Liveness probe: process is up and serving.
async fn health() -> Json<serde_json::Value> {
    Json(json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}
