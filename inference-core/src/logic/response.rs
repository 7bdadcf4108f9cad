//! Response shaping
//!
//! The only place values are rounded for display. Everything upstream keeps
//! full precision.

use serde::{Deserialize, Serialize};

use crate::constants::{DEFAULT_TOP_N, DISPLAY_DECIMALS};
use crate::logic::explain::FeatureAttribution;
use crate::logic::features::FEATURE_VERSION;
use crate::logic::model::context::ModelMetadata;
use crate::logic::model::inference::{PredictOptions, Prediction};
use crate::logic::model::threshold::RiskBucket;

/// Round half away from zero to `decimals` places
pub fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}

/// Prediction response body
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictResponse {
    pub sepsis_probability: f64,
    pub sepsis_label: u8,
    pub risk_bucket: RiskBucket,
    pub confidence: f64,
    /// Never more than `DEFAULT_TOP_N` entries
    pub shap_top5: Vec<FeatureAttribution>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shap_all_features: Option<Vec<FeatureAttribution>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shap_expected_value: Option<f64>,
    pub model_version: String,
    pub feature_version: u8,
}

impl PredictResponse {
    pub fn from_prediction(
        prediction: &Prediction,
        options: &PredictOptions,
        metadata: &ModelMetadata,
    ) -> Self {
        Self {
            sepsis_probability: round_to(prediction.probability, DISPLAY_DECIMALS),
            sepsis_label: prediction.label,
            risk_bucket: prediction.bucket,
            confidence: round_to(prediction.confidence, DISPLAY_DECIMALS),
            shap_top5: prediction.top(options.top_n.min(DEFAULT_TOP_N)).to_vec(),
            shap_all_features: options
                .include_all
                .then(|| prediction.explanation.attributions.clone()),
            shap_expected_value: options
                .include_expected_value
                .then_some(prediction.explanation.expected_value),
            model_version: metadata.model_version.clone(),
            feature_version: FEATURE_VERSION,
        }
    }
}
