//! Health endpoint — unauthenticated liveness check.

use axum::Json;
use axum::extract::State;
use serde::Serialize;
use tracing::warn;

use crate::AppState;

/// Body of `GET /api/health`.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub version: String,
    pub store_ok: bool,
}

/// `GET /api/health` — reports the crate version and whether the store answers.
pub async fn health_handler(State(state): State<AppState>) -> Json<HealthResponse> {
    let store_ok = match state.store.ping().await {
        Ok(()) => true,
        Err(e) => {
            warn!("store ping failed: {e}");
            false
        }
    };

    Json(HealthResponse {
        version: shuttle_core::version().to_string(),
        store_ok,
    })
}
