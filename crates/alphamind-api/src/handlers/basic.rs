//! Health and root endpoints.

use axum::extract::State;
use serde_json::{json, Value};

use super::common::{ok, HandlerResult};
use super::ServerState;

/// Service health check.
///
/// GET /api/health
pub async fn health_handler(State(state): State<ServerState>) -> HandlerResult<Value> {
    let uptime = chrono::Utc::now().timestamp() - state.started_at;
    ok(json!({
        "status": "healthy",
        "service": "alphamind-api",
        "version": env!("CARGO_PKG_VERSION"),
        "uptime_seconds": uptime,
    }))
}

/// Root banner.
///
/// GET /
pub async fn index_handler() -> HandlerResult<Value> {
    ok(json!({
        "service": "AlphaMind API Server",
        "version": env!("CARGO_PKG_VERSION"),
        "status": "running",
    }))
}
