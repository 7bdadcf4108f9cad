//! Model Context - immutable inference state
//!
//! Built once at startup, then shared read-only (typically behind an `Arc`)
//! by every request. Holds no interior mutability.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::Serialize;

use super::artifacts::{load_artifacts, ArtifactPaths, AttributionBaseline};
use super::inference::{order_features, Classifier, PredictOptions, Prediction};
use super::threshold::ThresholdConfig;
use crate::error::{ArtifactError, InferenceError};
use crate::logic::explain::LinearExplainer;
use crate::logic::features::{feature_index, map_features, FeatureVector, RawInput, FEATURE_DEFS};
use crate::logic::response::PredictResponse;

/// Model metadata
#[derive(Debug, Clone, Serialize)]
pub struct ModelMetadata {
    pub model_type: String,
    pub model_version: String,
    pub feature_count: usize,
    pub baseline_samples: usize,
    pub loaded_at: DateTime<Utc>,
    /// artifact file name → SHA-256 hex
    pub digests: BTreeMap<String, String>,
    /// Trained features the mapper never produces
    pub unmapped_features: Vec<String>,
    /// Mapper features the model ignores
    pub unused_features: Vec<String>,
}

impl ModelMetadata {
    /// True when every trained feature is produced by the mapper
    pub fn layout_compatible(&self) -> bool {
        self.unmapped_features.is_empty()
    }
}

pub struct ModelContext {
    classifier: Box<dyn Classifier>,
    thresholds: ThresholdConfig,
    feature_order: Vec<String>,
    explainer: LinearExplainer,
    metadata: ModelMetadata,
}

impl std::fmt::Debug for ModelContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ModelContext")
            .field("model_type", &self.metadata.model_type)
            .field("model_version", &self.metadata.model_version)
            .field("thresholds", &self.thresholds)
            .field("features", &self.feature_order.len())
            .finish()
    }
}

impl ModelContext {
    /// Load and validate all artifacts from disk
    pub fn load(paths: &ArtifactPaths) -> Result<Self, ArtifactError> {
        log::info!("Loading model artifacts from {}", paths.model.display());

        let loaded = load_artifacts(paths)?;
        let thresholds = loaded.model.thresholds()?;
        let classifier = loaded.model.classifier()?;
        let baseline = AttributionBaseline::from_rows(loaded.background)
            .map_err(|reason| ArtifactError::invalid("background", reason))?;

        let mut context = Self::from_parts(classifier, thresholds, loaded.feature_order, baseline)?;
        context.metadata.model_version = loaded.model.version;
        context.metadata.digests = loaded.digests;

        log::info!(
            "Model ready: {} v{} ({} features, {} baseline rows, threshold {}, moderate {})",
            context.metadata.model_type,
            context.metadata.model_version,
            context.metadata.feature_count,
            context.metadata.baseline_samples,
            thresholds.threshold,
            thresholds.moderate_threshold,
        );

        Ok(context)
    }

    /// Assemble a context from in-memory parts (tests, embedded models)
    pub fn from_parts(
        classifier: Box<dyn Classifier>,
        thresholds: ThresholdConfig,
        feature_order: Vec<String>,
        baseline: AttributionBaseline,
    ) -> Result<Self, ArtifactError> {
        thresholds
            .validate()
            .map_err(|reason| ArtifactError::invalid("model", reason))?;

        if feature_order.is_empty() {
            return Err(ArtifactError::invalid("feature_order", "empty feature order"));
        }

        for (i, name) in feature_order.iter().enumerate() {
            if feature_order[..i].contains(name) {
                return Err(ArtifactError::invalid(
                    "feature_order",
                    format!("duplicate feature '{}'", name),
                ));
            }
        }

        if classifier.n_features() != feature_order.len() {
            return Err(ArtifactError::invalid(
                "model",
                format!(
                    "model has {} coefficients, feature order lists {}",
                    classifier.n_features(),
                    feature_order.len()
                ),
            ));
        }

        if baseline.n_features() != feature_order.len() {
            return Err(ArtifactError::invalid(
                "background",
                format!(
                    "baseline has {} columns, feature order lists {}",
                    baseline.n_features(),
                    feature_order.len()
                ),
            ));
        }

        let explainer = LinearExplainer::new(classifier.as_ref(), &baseline)
            .map_err(|reason| ArtifactError::invalid("model", reason))?;

        let unmapped_features: Vec<String> = feature_order
            .iter()
            .filter(|name| feature_index(name).is_none())
            .cloned()
            .collect();
        let unused_features: Vec<String> = FEATURE_DEFS
            .iter()
            .filter(|def| !feature_order.iter().any(|n| n == def.name))
            .map(|def| def.name.to_string())
            .collect();

        if !unmapped_features.is_empty() {
            log::error!(
                "Trained feature order names {} feature(s) the mapper never produces: {}. Every prediction will fail until mapper and model agree.",
                unmapped_features.len(),
                unmapped_features.join(", ")
            );
        }
        if !unused_features.is_empty() {
            log::warn!("Model ignores {} mapped feature(s): {}", unused_features.len(), unused_features.join(", "));
        }

        let metadata = ModelMetadata {
            model_type: classifier.model_type().to_string(),
            model_version: String::new(),
            feature_count: feature_order.len(),
            baseline_samples: baseline.n_samples(),
            loaded_at: Utc::now(),
            digests: BTreeMap::new(),
            unmapped_features,
            unused_features,
        };

        Ok(Self {
            classifier,
            thresholds,
            feature_order,
            explainer,
            metadata,
        })
    }

    pub fn thresholds(&self) -> &ThresholdConfig {
        &self.thresholds
    }

    pub fn feature_order(&self) -> &[String] {
        &self.feature_order
    }

    pub fn metadata(&self) -> &ModelMetadata {
        &self.metadata
    }

    /// Map, score and explain one raw record
    pub fn predict(&self, raw: &RawInput) -> Result<Prediction, InferenceError> {
        let vector = map_features(raw)?;
        self.predict_vector(&vector)
    }

    /// Score and explain an already-mapped vector
    pub fn predict_vector(&self, vector: &FeatureVector) -> Result<Prediction, InferenceError> {
        log::trace!("Feature vector: {}", vector.to_log_entry());
        let row = order_features(vector, &self.feature_order)?;

        let margin = self.classifier.margin(row.view())?;
        let probability = self.classifier.predict_proba(row.view())?;
        if !probability.is_finite() || !(0.0..=1.0).contains(&probability) {
            return Err(InferenceError::Model(format!(
                "probability out of range: {}",
                probability
            )));
        }

        let explanation = self.explainer.explain(row.view(), &self.feature_order);

        let prediction = Prediction {
            probability,
            margin,
            label: self.thresholds.label(probability),
            bucket: self.thresholds.bucket(probability),
            confidence: self.thresholds.confidence(probability),
            explanation,
        };

        log::debug!(
            "Prediction: p={:.4} label={} bucket={} top={}",
            prediction.probability,
            prediction.label,
            prediction.bucket,
            prediction.top(1).first().map_or("-", |a| a.feature.as_str())
        );

        Ok(prediction)
    }

    /// Full request path: raw record in, display-ready response out
    pub fn respond(
        &self,
        raw: &RawInput,
        options: &PredictOptions,
    ) -> Result<PredictResponse, InferenceError> {
        let prediction = self.predict(raw)?;
        Ok(PredictResponse::from_prediction(&prediction, options, &self.metadata))
    }
}
