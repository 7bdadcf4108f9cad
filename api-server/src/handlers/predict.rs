//! Prediction handler

use axum::{
    extract::{
        rejection::{JsonRejection, QueryRejection},
        Query, State,
    },
    Json,
};
use septoctor_core::{PredictResponse, RawInput};
use std::sync::Arc;
use validator::Validate;

use crate::models::PredictQuery;
use crate::{AppError, AppResult, AppState};

/// Score one raw record
///
/// Mapping, inference and attribution run together on the blocking pool;
/// the request either gets a complete response or a single error.
pub async fn predict(
    State(state): State<AppState>,
    query: Result<Query<PredictQuery>, QueryRejection>,
    body: Result<Json<RawInput>, JsonRejection>,
) -> AppResult<Json<PredictResponse>> {
    let Query(query) = query.map_err(|e| AppError::BadRequest(e.body_text()))?;
    query
        .validate()
        .map_err(|e| AppError::BadRequest(e.to_string()))?;
    let Json(raw) = body.map_err(|e| AppError::BadRequest(e.body_text()))?;

    let options = query.options(state.config.default_top_n);
    let model = Arc::clone(&state.model);

    tracing::debug!(fields = raw.len(), top_n = options.top_n, "Predict request");

    let response = tokio::task::spawn_blocking(move || model.respond(&raw, &options)).await??;

    tracing::info!(
        probability = response.sepsis_probability,
        bucket = %response.risk_bucket,
        "Prediction served"
    );

    Ok(Json(response))
}
