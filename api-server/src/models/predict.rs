//! Prediction request model

use serde::Deserialize;
use septoctor_core::PredictOptions;
use validator::Validate;

/// Query string of `POST /predict`
#[derive(Debug, Default, Deserialize, Validate)]
pub struct PredictQuery {
    /// Top contributors to return, at most `DEFAULT_TOP_N`
    #[validate(range(min = 1, max = 5))]
    pub top_n: Option<usize>,

    /// Include the full attribution list and expected value (default true)
    pub full: Option<bool>,
}

impl PredictQuery {
    pub fn options(&self, default_top_n: usize) -> PredictOptions {
        let full = self.full.unwrap_or(true);
        PredictOptions {
            top_n: self.top_n.unwrap_or(default_top_n),
            include_all: full,
            include_expected_value: full,
        }
    }
}
