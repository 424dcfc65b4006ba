use axum::{extract::State, http::StatusCode, Json};
use serde_json::{json, Value};

use crate::startup::AppState;

/// GET /health
pub async fn health(State(state): State<AppState>) -> (StatusCode, Json<Value>) {
    match state.store.health_check().await {
        Ok(()) => (StatusCode::OK, Json(json!({ "status": "ok" }))),
        Err(e) => {
            tracing::warn!("Health check failed: {}", e);
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(json!({ "status": "unavailable", "message": e.to_string() })),
            )
        }
    }
}
