//! Clinical scores handler

use axum::{extract::rejection::JsonRejection, Json};
use septoctor_core::{clinical_scores, ClinicalScores, RawInput};

use crate::{AppError, AppResult};

/// MNRS, HSS and APGAR for one record
pub async fn compute(
    body: Result<Json<RawInput>, JsonRejection>,
) -> AppResult<Json<ClinicalScores>> {
    let Json(raw) = body.map_err(|e| AppError::BadRequest(e.body_text()))?;
    let scores = clinical_scores(&raw)?;

    tracing::debug!(
        mnrs = scores.mnrs.score,
        hss = scores.hss.score,
        "Clinical scores computed"
    );

    Ok(Json(scores))
}
