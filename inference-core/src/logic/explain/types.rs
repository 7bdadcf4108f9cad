use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureAttribution {
    pub feature: String,
    pub display_name: String,
    pub impact: f64, // signed, margin space
}

/// Ranked attributions for one input
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Explanation {
    /// Model margin at the baseline
    pub expected_value: f64,
    /// Sorted by descending |impact|
    pub attributions: Vec<FeatureAttribution>,
}

impl Explanation {
    pub fn top(&self, n: usize) -> &[FeatureAttribution] {
        &self.attributions[..n.min(self.attributions.len())]
    }

    /// expected_value + Σ impact; equals the model margin for linear models
    pub fn reconstructed_margin(&self) -> f64 {
        self.expected_value + self.attributions.iter().map(|a| a.impact).sum::<f64>()
    }
}
