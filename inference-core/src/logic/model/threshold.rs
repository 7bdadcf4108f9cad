//! Decision Thresholds
//!
//! Two fixed cut points shipped with the model artifact. They are never
//! recomputed per request.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Three-level risk classification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RiskBucket {
    Low,
    Moderate,
    High,
}

impl RiskBucket {
    pub fn as_str(&self) -> &'static str {
        match self {
            RiskBucket::Low => "Low",
            RiskBucket::Moderate => "Moderate",
            RiskBucket::High => "High",
        }
    }
}

impl fmt::Display for RiskBucket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Threshold Configuration
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ThresholdConfig {
    /// Primary classification threshold (label = 1, bucket = High)
    pub threshold: f64,

    /// Lower bound of the Moderate bucket
    pub moderate_threshold: f64,
}

impl Default for ThresholdConfig {
    fn default() -> Self {
        Self {
            threshold: 0.5,
            moderate_threshold: 0.3,
        }
    }
}

impl ThresholdConfig {
    pub fn new(threshold: f64, moderate_threshold: f64) -> Result<Self, String> {
        let config = Self {
            threshold,
            moderate_threshold,
        };
        config.validate()?;
        Ok(config)
    }

    /// Both thresholds finite in [0, 1], moderate not above primary.
    pub fn validate(&self) -> Result<(), String> {
        for (name, value) in [
            ("threshold", self.threshold),
            ("moderate_threshold", self.moderate_threshold),
        ] {
            if !value.is_finite() || !(0.0..=1.0).contains(&value) {
                return Err(format!("{} must be within [0, 1], got {}", name, value));
            }
        }

        if self.moderate_threshold > self.threshold {
            return Err(format!(
                "moderate_threshold ({}) exceeds threshold ({})",
                self.moderate_threshold, self.threshold
            ));
        }

        Ok(())
    }

    /// Binary decision, inclusive at the threshold
    pub fn label(&self, probability: f64) -> u8 {
        (probability >= self.threshold) as u8
    }

    /// Risk bucket; lower bounds are inclusive
    pub fn bucket(&self, probability: f64) -> RiskBucket {
        if probability >= self.threshold {
            RiskBucket::High
        } else if probability >= self.moderate_threshold {
            RiskBucket::Moderate
        } else {
            RiskBucket::Low
        }
    }

    /// Distance from the decision threshold.
    ///
    /// This is a margin, not a calibrated confidence interval: 0 means the
    /// prediction sits exactly on the threshold.
    pub fn confidence(&self, probability: f64) -> f64 {
        (probability - self.threshold).abs()
    }
}
