//! Clinical Scores - rule-based bedside scores
//!
//! MNRS (Maternal Neonatal Risk Score), HSS (Hematologic Scoring System)
//! and APGAR totals, computed from the same raw record the model sees.
//! Independent of the model artifacts.

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;
use crate::logic::features::raw::{coerce_flag, coerce_float, coerce_integer, RawInput, RawValue};

const HSS_FIELDS: [&str; 7] = [
    "hss_tlc_abnormal",
    "hss_anc_abnormal",
    "hss_it_ratio_high",
    "hss_im_ratio_high",
    "hss_platelet_low",
    "hss_neutrophil_degeneration",
    "hss_nrbc_elevated",
];

const APGAR_COMPONENTS: [&str; 5] = ["appearance", "pulse", "grimace", "activity", "respiration"];

/// Risk level of a bedside score
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ScoreRisk {
    Low,
    Moderate,
    High,
    #[serde(rename = "Very High")]
    VeryHigh,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreResult {
    pub score: u32,
    pub risk: ScoreRisk,
    pub action: String,
}

impl ScoreResult {
    fn new(score: u32, risk: ScoreRisk, action: &str) -> Self {
        Self {
            score,
            risk,
            action: action.to_string(),
        }
    }
}

/// All bedside scores for one record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClinicalScores {
    pub mnrs: ScoreResult,
    pub hss: ScoreResult,
    /// None when no 1-minute APGAR component was supplied
    pub apgar1: Option<ScoreResult>,
    /// None when no 5-minute APGAR component was supplied
    pub apgar5: Option<ScoreResult>,
}

// ============================================================================
// HELPERS
// ============================================================================

/// Value unless absent, null or blank text
fn present<'a>(raw: &'a RawInput, field: &str) -> Option<&'a RawValue> {
    raw.get(field).filter(|v| !matches!(v, RawValue::Text(s) if s.trim().is_empty()))
}

fn yes(raw: &RawInput, field: &str) -> bool {
    coerce_flag(raw.get(field)) == 1
}

fn is(raw: &RawInput, field: &str, token: &str) -> bool {
    raw.get(field).is_some_and(|v| v.matches_category(token))
}

/// Numeric field with a clinical default when absent
fn number_or(raw: &RawInput, field: &str, default: f64) -> Result<f64, ValidationError> {
    match present(raw, field) {
        Some(value) => coerce_float(field, Some(value)),
        None => Ok(default),
    }
}

/// Sum of the five APGAR components for one minute, if any was supplied
pub fn apgar_total(raw: &RawInput, minute: u8) -> Result<Option<u32>, ValidationError> {
    let mut total = 0u32;
    let mut supplied = false;

    for component in APGAR_COMPONENTS {
        let field = format!("apgar{}_{}", minute, component);
        let Some(value) = present(raw, &field) else {
            continue;
        };
        supplied = true;

        let points = coerce_integer(&field, Some(value))?;
        if !(0..=2).contains(&points) {
            return Err(ValidationError {
                field,
                value: value.to_display(),
                expected: "APGAR component (0-2)",
            });
        }
        total += points as u32;
    }

    Ok(supplied.then_some(total))
}

// ============================================================================
// MNRS
// ============================================================================

/// Maternal Neonatal Risk Score
pub fn mnrs_score(raw: &RawInput) -> Result<u32, ValidationError> {
    let mut s = 0;

    // Antenatal / peripartum
    if yes(raw, "prom_present") && number_or(raw, "prom_duration_hours", 0.0)? >= 18.0 {
        s += 3;
    }
    if yes(raw, "chorioamnionitis") {
        s += 3;
    }
    if number_or(raw, "maternal_fever_celsius", 0.0)? >= 38.0 {
        s += 3;
    }
    if yes(raw, "foul_smelling_liquor") {
        s += 2;
    }
    if coerce_integer("pv_examinations_count", present(raw, "pv_examinations_count"))? >= 3 {
        s += 2;
    }
    if yes(raw, "meconium_stained_liquor") {
        s += 2;
    }
    if yes(raw, "prolonged_labor") {
        s += 2;
    }
    for field in ["unbooked_pregnancy", "maternal_uti_sti", "cotwin_iud"] {
        if yes(raw, field) {
            s += 1;
        }
    }

    // Neonatal baseline
    if is(raw, "gestational_age_category", "<34 weeks") {
        s += 3;
    } else if is(raw, "gestational_age_category", "34–36 weeks") {
        s += 2;
    }

    if is(raw, "birth_weight_category", "<1500 g") {
        s += 3;
    } else if is(raw, "birth_weight_category", "1500–2499 g") {
        s += 2;
    }

    let apgar5 = apgar_total(raw, 5)?;
    let apgar1 = apgar_total(raw, 1)?;
    if apgar5.is_some_and(|t| t < 7) {
        s += 3;
    } else if apgar1.is_some_and(|t| t < 7) {
        s += 2;
    }

    if yes(raw, "resuscitation_required") {
        s += 3;
    }
    if is(raw, "neonatal_sex", "male") {
        s += 1;
    }

    // Early clinical signs (0-72h)
    let temperature = number_or(raw, "temperature_celsius", 37.0)?;
    if !(36.0..=38.0).contains(&temperature) {
        s += 3;
    }
    if is(raw, "feeding_status", "poor") || is(raw, "activity_level", "lethargic") {
        s += 3;
    }
    if yes(raw, "apnea_present") || yes(raw, "shock_present") {
        s += 3;
    }
    if number_or(raw, "heart_rate_bpm", 120.0)? > 160.0 {
        s += 2;
    }
    if is(raw, "respiratory_distress", "mild") || is(raw, "respiratory_distress", "severe") {
        s += 2;
    }

    Ok(s)
}

pub fn mnrs_category(score: u32) -> ScoreResult {
    match score {
        0..=5 => ScoreResult::new(score, ScoreRisk::Low, "Observe"),
        6..=10 => ScoreResult::new(score, ScoreRisk::Moderate, "Do Sepsis Screen"),
        11..=15 => ScoreResult::new(score, ScoreRisk::High, "Start Antibiotics"),
        _ => ScoreResult::new(score, ScoreRisk::VeryHigh, "Treat as Sepsis"),
    }
}

// ============================================================================
// HSS
// ============================================================================

/// Hematologic Scoring System: one point per abnormal finding
pub fn hss_score(raw: &RawInput) -> u32 {
    HSS_FIELDS.iter().filter(|f| yes(raw, f)).count() as u32
}

pub fn hss_category(score: u32) -> ScoreResult {
    if score >= 5 {
        ScoreResult::new(score, ScoreRisk::High, "Review hematologic abnormalities")
    } else if score >= 3 {
        ScoreResult::new(score, ScoreRisk::Moderate, "Monitor closely")
    } else {
        ScoreResult::new(score, ScoreRisk::Low, "Continue observation")
    }
}

// ============================================================================
// APGAR
// ============================================================================

pub fn apgar1_category(score: u32) -> ScoreResult {
    match score {
        0..=2 => ScoreResult::new(score, ScoreRisk::High, "Immediate intervention required"),
        3..=6 => ScoreResult::new(score, ScoreRisk::Moderate, "Monitor and support"),
        _ => ScoreResult::new(score, ScoreRisk::Low, "Routine care"),
    }
}

pub fn apgar5_category(score: u32) -> ScoreResult {
    match score {
        0..=2 => ScoreResult::new(score, ScoreRisk::High, "Intensive care monitoring"),
        3..=6 => ScoreResult::new(score, ScoreRisk::Moderate, "Close observation"),
        _ => ScoreResult::new(score, ScoreRisk::Low, "Standard monitoring"),
    }
}

/// Compute every bedside score for a record
pub fn clinical_scores(raw: &RawInput) -> Result<ClinicalScores, ValidationError> {
    Ok(ClinicalScores {
        mnrs: mnrs_category(mnrs_score(raw)?),
        hss: hss_category(hss_score(raw)),
        apgar1: apgar_total(raw, 1)?.map(apgar1_category),
        apgar5: apgar_total(raw, 5)?.map(apgar5_category),
    })
}
