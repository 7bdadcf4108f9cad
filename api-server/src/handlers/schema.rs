//! Feature schema handler

use axum::{extract::State, Json};

use crate::models::SchemaResponse;
use crate::AppState;

/// Mapper layout next to the trained feature order
pub async fn describe(State(state): State<AppState>) -> Json<SchemaResponse> {
    Json(SchemaResponse::describe(&state.model))
}
