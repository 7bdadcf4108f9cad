//! Logic Module - mapping, inference and explanation engines
//!
//! - `features/` - raw input → versioned feature vector
//! - `model/` - artifacts, classifier, thresholds
//! - `explain/` - additive attribution and ranking
//! - `scoring` - rule-based bedside scores
//! - `response` - display-ready output

pub mod explain;
pub mod features;
pub mod model;
pub mod response;
pub mod scoring;
