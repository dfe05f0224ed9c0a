//! Health check

use axum::Json;
use serde_json::{json, Value};

/// GET /healthz - liveness probe, no auth
pub async fn health_check() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}
