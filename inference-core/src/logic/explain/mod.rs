//! Explain Module - per-feature attribution of a single prediction

pub mod engine;
pub mod types;

pub use engine::{display_name, rank, LinearExplainer};
pub use types::{Explanation, FeatureAttribution};
