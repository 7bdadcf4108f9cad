use ndarray::{Array1, ArrayView1};

use super::types::{Explanation, FeatureAttribution};
use crate::logic::model::artifacts::AttributionBaseline;
use crate::logic::model::inference::Classifier;

/// Exact additive attribution for linear-margin models.
///
/// Interventional form: phi_i = w_i * (x_i - mean_i), with the baseline
/// expectation E = b + w·mean. Then E + Σ phi_i equals the margin.
#[derive(Debug, Clone)]
pub struct LinearExplainer {
    weights: Array1<f64>,
    baseline_mean: Array1<f64>,
    expected_value: f64,
}

impl LinearExplainer {
    pub fn new(classifier: &dyn Classifier, baseline: &AttributionBaseline) -> Result<Self, String> {
        let (weights, intercept) = classifier.linear_terms().ok_or_else(|| {
            format!("attribution unsupported for model type '{}'", classifier.model_type())
        })?;

        if weights.len() != baseline.n_features() {
            return Err(format!(
                "baseline has {} features, model has {}",
                baseline.n_features(),
                weights.len()
            ));
        }

        let baseline_mean = baseline.mean().to_owned();
        let expected_value = intercept + weights.dot(&baseline_mean);

        Ok(Self {
            weights: weights.to_owned(),
            baseline_mean,
            expected_value,
        })
    }

    pub fn expected_value(&self) -> f64 {
        self.expected_value
    }

    /// Raw per-feature attributions in trained order
    pub fn attributions(&self, row: ArrayView1<'_, f64>) -> Array1<f64> {
        (&row - &self.baseline_mean) * &self.weights
    }

    /// Named, ranked attributions
    pub fn explain(&self, row: ArrayView1<'_, f64>, feature_order: &[String]) -> Explanation {
        let impacts = self.attributions(row);

        let attributions = feature_order
            .iter()
            .zip(impacts.iter())
            .map(|(name, &impact)| FeatureAttribution {
                feature: name.clone(),
                display_name: display_name(name),
                impact,
            })
            .collect();

        Explanation {
            expected_value: self.expected_value,
            attributions: rank(attributions),
        }
    }
}

/// Sort by descending |impact|. Stable, so ties keep trained order.
pub fn rank(mut attributions: Vec<FeatureAttribution>) -> Vec<FeatureAttribution> {
    attributions.sort_by(|a, b| b.impact.abs().total_cmp(&a.impact.abs()));
    attributions
}

/// Human-readable label for a model feature
pub fn display_name(feature: &str) -> String {
    let curated = match feature {
        "prom_duration_hours" => Some("PROM duration (hours)"),
        "maternal_fever_celsius" => Some("Maternal fever (°C)"),
        "temperature_celsius" => Some("Neonatal temperature (°C)"),
        "heart_rate_bpm" => Some("Heart rate (bpm)"),
        "pv_examinations_count" => Some("PV examinations"),
        "gestational_age_weeks" => Some("Gestational age (weeks)"),
        "birth_weight_grams" => Some("Birth weight (g)"),
        "prom_present_yes" => Some("PROM present"),
        "maternal_uti_sti_yes" => Some("Maternal UTI/STI"),
        "cotwin_iud_yes" => Some("Co-twin IUD"),
        "hss_tlc_abnormal_yes" => Some("Abnormal total leukocyte count"),
        "hss_anc_abnormal_yes" => Some("Abnormal absolute neutrophil count"),
        "hss_it_ratio_high_yes" => Some("High I:T ratio"),
        "hss_im_ratio_high_yes" => Some("High I:M ratio"),
        "hss_platelet_low_yes" => Some("Low platelet count"),
        "hss_neutrophil_degeneration_yes" => Some("Degenerative neutrophil changes"),
        "hss_nrbc_elevated_yes" => Some("Elevated nucleated RBCs"),
        "neonatal_sex_male" => Some("Male sex"),
        "gestational_age_category__34_weeks" => Some("Gestational age <34 weeks"),
        "gestational_age_category__37_weeks" => Some("Gestational age ≥37 weeks"),
        _ => None,
    };

    match curated {
        Some(name) => name.to_string(),
        None => {
            let base = feature.strip_suffix("_yes").unwrap_or(feature).replace('_', " ");
            let mut chars = base.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect(),
                None => base,
            }
        }
    }
}
