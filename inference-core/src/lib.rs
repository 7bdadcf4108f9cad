//! Septoctor Core
//!
//! Neonatal sepsis risk inference: maps UI-level observations onto the
//! trained feature layout, scores them with a pre-trained classifier,
//! buckets the probability and explains which features drove it.
//!
//! ```text
//! RawInput ──► map_features ──► FeatureVector ──► ModelContext ──► PredictResponse
//!                                  (layout)        (model, thresholds,
//!                                                   baseline, explainer)
//! ```
//!
//! Everything here is synchronous and free of I/O once the
//! [`ModelContext`] has been loaded.

pub mod constants;
pub mod error;
pub mod logic;

pub use error::{ArtifactError, InferenceError, SchemaMismatchError, ValidationError};
pub use logic::explain::{Explanation, FeatureAttribution};
pub use logic::features::{map_features, FeatureVector, LayoutInfo, RawInput, RawValue};
pub use logic::model::{
    ArtifactPaths, ModelContext, ModelMetadata, PredictOptions, Prediction, RiskBucket,
    ThresholdConfig,
};
pub use logic::response::PredictResponse;
pub use logic::scoring::{clinical_scores, ClinicalScores};
