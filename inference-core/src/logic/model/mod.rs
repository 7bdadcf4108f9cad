//! Model Module - artifacts, scoring and decision thresholds
//!
//! Artifacts are loaded once into an immutable `ModelContext`; every
//! request borrows it read-only.

pub mod artifacts;
pub mod context;
pub mod inference;
pub mod threshold;

#[cfg(test)]
mod tests;

// Re-export common types
pub use artifacts::{ArtifactPaths, AttributionBaseline, ModelArtifact};
pub use context::{ModelContext, ModelMetadata};
pub use inference::{Classifier, LogisticModel, PredictOptions, Prediction};
pub use threshold::{RiskBucket, ThresholdConfig};
