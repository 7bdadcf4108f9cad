//! Inference Engine - classifier seam and trained-order alignment
//!
//! The mapper emits features in layout order; the model expects the order
//! recorded at training time. `order_features` bridges the two by name.

use std::fmt;

use ndarray::{Array1, ArrayView1};
use serde::{Deserialize, Serialize};

use super::threshold::RiskBucket;
use crate::constants::DEFAULT_TOP_N;
use crate::error::{InferenceError, SchemaMismatchError};
use crate::logic::explain::{Explanation, FeatureAttribution};
use crate::logic::features::FeatureVector;

// ============================================================================
// CLASSIFIER TRAIT
// ============================================================================

/// Trait for binary classifiers scoring a single trained-order row
pub trait Classifier: fmt::Debug + Send + Sync {
    /// Short model family name, e.g. "logistic_regression"
    fn model_type(&self) -> &str;

    /// Number of input features expected
    fn n_features(&self) -> usize;

    /// Raw model output before the link function (log-odds)
    fn margin(&self, row: ArrayView1<'_, f64>) -> Result<f64, InferenceError>;

    /// Probability of the positive ("at risk") class
    fn predict_proba(&self, row: ArrayView1<'_, f64>) -> Result<f64, InferenceError>;

    /// Coefficients and intercept when the margin is linear in the inputs.
    /// Exact additive attribution is only available for these models.
    fn linear_terms(&self) -> Option<(ArrayView1<'_, f64>, f64)> {
        None
    }
}

// ============================================================================
// LOGISTIC REGRESSION
// ============================================================================

/// Binary logistic regression: p = σ(b + w·x)
#[derive(Debug, Clone, PartialEq)]
pub struct LogisticModel {
    intercept: f64,
    coefficients: Array1<f64>,
}

impl LogisticModel {
    pub fn new(intercept: f64, coefficients: Vec<f64>) -> Self {
        Self {
            intercept,
            coefficients: Array1::from(coefficients),
        }
    }

    pub fn intercept(&self) -> f64 {
        self.intercept
    }

    pub fn coefficients(&self) -> ArrayView1<'_, f64> {
        self.coefficients.view()
    }
}

impl Classifier for LogisticModel {
    fn model_type(&self) -> &str {
        "logistic_regression"
    }

    fn n_features(&self) -> usize {
        self.coefficients.len()
    }

    fn margin(&self, row: ArrayView1<'_, f64>) -> Result<f64, InferenceError> {
        if row.len() != self.coefficients.len() {
            return Err(InferenceError::Model(format!(
                "expected {} features, got {}",
                self.coefficients.len(),
                row.len()
            )));
        }
        Ok(self.intercept + self.coefficients.dot(&row))
    }

    fn predict_proba(&self, row: ArrayView1<'_, f64>) -> Result<f64, InferenceError> {
        self.margin(row).map(sigmoid)
    }

    fn linear_terms(&self) -> Option<(ArrayView1<'_, f64>, f64)> {
        Some((self.coefficients.view(), self.intercept))
    }
}

/// Logistic function, stable for large |z|
pub fn sigmoid(z: f64) -> f64 {
    if z >= 0.0 {
        1.0 / (1.0 + (-z).exp())
    } else {
        let e = z.exp();
        e / (1.0 + e)
    }
}

// ============================================================================
// FEATURE ORDERING
// ============================================================================

/// Reorder a mapped vector into the trained feature order.
///
/// Every trained name must be present in the vector; the error lists all
/// of the missing ones, not just the first.
pub fn order_features(
    vector: &FeatureVector,
    feature_order: &[String],
) -> Result<Array1<f64>, SchemaMismatchError> {
    let mismatch = |missing: Vec<String>| {
        let err = SchemaMismatchError {
            missing,
            layout_version: vector.version,
            layout_hash: vector.layout_hash,
        };
        log::error!("Feature schema mismatch, mapper and model have drifted: {}", err);
        err
    };

    // A vector from a different layout cannot be looked up by name.
    if !vector.is_compatible() {
        return Err(mismatch(feature_order.to_vec()));
    }

    let mut row = Vec::with_capacity(feature_order.len());
    let mut missing = Vec::new();

    for name in feature_order {
        match vector.get_by_name(name) {
            Some(value) => row.push(value),
            None => missing.push(name.clone()),
        }
    }

    if !missing.is_empty() {
        return Err(mismatch(missing));
    }

    Ok(Array1::from(row))
}

// ============================================================================
// PREDICTION
// ============================================================================

/// Per-request shaping options
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PredictOptions {
    /// Number of top contributors to return
    pub top_n: usize,
    /// Include the full ranked attribution list
    pub include_all: bool,
    /// Include the baseline expected value
    pub include_expected_value: bool,
}

impl Default for PredictOptions {
    fn default() -> Self {
        Self {
            top_n: DEFAULT_TOP_N,
            include_all: true,
            include_expected_value: true,
        }
    }
}

/// Full-precision prediction output
#[derive(Debug, Clone, PartialEq)]
pub struct Prediction {
    /// Probability of sepsis, in [0, 1]
    pub probability: f64,
    /// Model margin (log-odds)
    pub margin: f64,
    pub label: u8,
    pub bucket: RiskBucket,
    /// |probability − threshold|, see `ThresholdConfig::confidence`
    pub confidence: f64,
    pub explanation: Explanation,
}

impl Prediction {
    /// Top-N contributors, a prefix of the full ranked list
    pub fn top(&self, n: usize) -> &[FeatureAttribution] {
        self.explanation.top(n)
    }
}
