//! Health check handler

use axum::{extract::State, Json};
use chrono::{DateTime, Utc};
use septoctor_core::constants::APP_VERSION;
use serde::Serialize;

use crate::AppState;

#[derive(Serialize)]
pub struct HealthResponse {
    status: &'static str,
    version: &'static str,
    model_version: String,
    model_loaded_at: DateTime<Utc>,
    timestamp: i64,
}

pub async fn check(State(state): State<AppState>) -> Json<HealthResponse> {
    let metadata = state.model.metadata();

    Json(HealthResponse {
        status: if metadata.layout_compatible() { "healthy" } else { "degraded" },
        version: APP_VERSION,
        model_version: metadata.model_version.clone(),
        model_loaded_at: metadata.loaded_at,
        timestamp: Utc::now().timestamp(),
    })
}
