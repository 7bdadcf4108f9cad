//! Feature Layout - Centralized Feature Definition
//!
//! **CRITICAL: This file controls the model input schema**
//!
//! ## Rules (NEVER break these):
//! 1. Add feature → increment FEATURE_VERSION
//! 2. Change order → increment FEATURE_VERSION
//! 3. Remove or rename feature → increment FEATURE_VERSION
//!
//! A trained model is bound to exactly this list. Changing it without
//! retraining silently corrupts predictions.

use crc32fast::Hasher;
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};

// ============================================================================
// FEATURE VERSION
// ============================================================================

/// Current feature layout version
/// MUST be incremented when layout changes
pub const FEATURE_VERSION: u8 = 1;

// ============================================================================
// FEATURE KINDS
// ============================================================================

/// How a raw input field is normalized into a single feature value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeatureKind {
    /// Numeric passthrough, floating point. Absent → 0.0.
    Float,
    /// Numeric passthrough, integer (counts, ordinal scores). Absent → 0.
    Integer,
    /// Presence flag: 1 for an affirmative answer, else 0.
    Flag,
    /// One-hot indicator: 1 when the raw value is this category token.
    Category(&'static str),
}

impl FeatureKind {
    /// True when the feature only ever holds whole numbers.
    pub fn is_integral(&self) -> bool {
        !matches!(self, FeatureKind::Float)
    }
}

/// One model feature and the raw field it is derived from.
#[derive(Debug, Clone, Copy)]
pub struct FeatureDef {
    pub name: &'static str,
    pub source: &'static str,
    pub kind: FeatureKind,
}

const fn float(name: &'static str) -> FeatureDef {
    FeatureDef { name, source: name, kind: FeatureKind::Float }
}

const fn integer(name: &'static str) -> FeatureDef {
    FeatureDef { name, source: name, kind: FeatureKind::Integer }
}

const fn flag(name: &'static str, source: &'static str) -> FeatureDef {
    FeatureDef { name, source, kind: FeatureKind::Flag }
}

const fn category(name: &'static str, source: &'static str, token: &'static str) -> FeatureDef {
    FeatureDef { name, source, kind: FeatureKind::Category(token) }
}

// ============================================================================
// FEATURE LAYOUT (Authoritative source)
// ============================================================================

/// Features in the exact order the mapper emits them.
/// This is the SINGLE SOURCE OF TRUTH for the mapper contract.
pub const FEATURE_DEFS: &[FeatureDef] = &[
    // === Numeric passthrough (0-6) ===
    float("prom_duration_hours"),
    float("maternal_fever_celsius"),
    float("temperature_celsius"),
    float("heart_rate_bpm"),
    integer("pv_examinations_count"),
    float("gestational_age_weeks"),
    float("birth_weight_grams"),

    // === Maternal / perinatal flags (7-14) ===
    flag("prom_present_yes", "prom_present"),
    flag("chorioamnionitis_yes", "chorioamnionitis"),
    flag("foul_smelling_liquor_yes", "foul_smelling_liquor"),
    flag("prolonged_labor_yes", "prolonged_labor"),
    flag("unbooked_pregnancy_yes", "unbooked_pregnancy"),
    flag("maternal_uti_sti_yes", "maternal_uti_sti"),
    flag("meconium_stained_liquor_yes", "meconium_stained_liquor"),
    flag("cotwin_iud_yes", "cotwin_iud"),

    // === Clinical flags (15-16) ===
    flag("apnea_present_yes", "apnea_present"),
    flag("shock_present_yes", "shock_present"),

    // === Hematologic scoring flags (17-23) ===
    flag("hss_tlc_abnormal_yes", "hss_tlc_abnormal"),
    flag("hss_anc_abnormal_yes", "hss_anc_abnormal"),
    flag("hss_it_ratio_high_yes", "hss_it_ratio_high"),
    flag("hss_im_ratio_high_yes", "hss_im_ratio_high"),
    flag("hss_platelet_low_yes", "hss_platelet_low"),
    flag("hss_neutrophil_degeneration_yes", "hss_neutrophil_degeneration"),
    flag("hss_nrbc_elevated_yes", "hss_nrbc_elevated"),

    // === Resuscitation (24) ===
    flag("resuscitation_required_yes", "resuscitation_required"),

    // === One-hot groups (25-32) ===
    category("feeding_status_normal", "feeding_status", "normal"),
    category("feeding_status_poor", "feeding_status", "poor"),
    category("activity_level_lethargic", "activity_level", "lethargic"),
    category("respiratory_distress_none", "respiratory_distress", "none"),
    category("respiratory_distress_severe", "respiratory_distress", "severe"),
    category("neonatal_sex_male", "neonatal_sex", "male"),
    category("gestational_age_category__34_weeks", "gestational_age_category", "<34 weeks"),
    category("gestational_age_category__37_weeks", "gestational_age_category", "≥37 weeks"),

    // === APGAR components (33-42) ===
    integer("apgar1_appearance"),
    integer("apgar1_pulse"),
    integer("apgar1_grimace"),
    integer("apgar1_activity"),
    integer("apgar1_respiration"),
    integer("apgar5_appearance"),
    integer("apgar5_pulse"),
    integer("apgar5_grimace"),
    integer("apgar5_activity"),
    integer("apgar5_respiration"),
];

/// Total number of features
/// IMPORTANT: Must match FEATURE_DEFS.len()!
pub const FEATURE_COUNT: usize = 43;

const _: () = assert!(FEATURE_DEFS.len() == FEATURE_COUNT);

// ============================================================================
// LAYOUT HASH
// ============================================================================

/// Compute CRC32 hash of the feature layout
/// Used to detect layout mismatches at runtime
pub fn compute_layout_hash() -> u32 {
    let mut hasher = Hasher::new();

    hasher.update(&[FEATURE_VERSION]);

    for def in FEATURE_DEFS {
        hasher.update(def.name.as_bytes());
        hasher.update(&[0]); // Separator
    }

    hasher.finalize()
}

static LAYOUT_HASH: Lazy<u32> = Lazy::new(compute_layout_hash);

/// Get layout hash (computed once)
pub fn layout_hash() -> u32 {
    *LAYOUT_HASH
}

// ============================================================================
// LAYOUT INFO
// ============================================================================

/// Complete layout information for serialization/logging
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LayoutInfo {
    pub version: u8,
    pub hash: u32,
    pub feature_count: usize,
    pub feature_names: Vec<String>,
}

impl LayoutInfo {
    pub fn current() -> Self {
        Self {
            version: FEATURE_VERSION,
            hash: layout_hash(),
            feature_count: FEATURE_COUNT,
            feature_names: FEATURE_DEFS.iter().map(|d| d.name.to_string()).collect(),
        }
    }
}

impl Default for LayoutInfo {
    fn default() -> Self {
        Self::current()
    }
}

// ============================================================================
// LAYOUT VALIDATION
// ============================================================================

/// Error when feature layout doesn't match expected
#[derive(Debug, Clone, thiserror::Error)]
#[error(
    "Feature layout mismatch: expected v{expected_version} (hash: {expected_hash:08x}), got v{actual_version} (hash: {actual_hash:08x})"
)]
pub struct LayoutMismatchError {
    pub expected_version: u8,
    pub expected_hash: u32,
    pub actual_version: u8,
    pub actual_hash: u32,
}

/// Validate that incoming data matches current layout
pub fn validate_layout(incoming_version: u8, incoming_hash: u32) -> Result<(), LayoutMismatchError> {
    let current_hash = layout_hash();

    if incoming_version != FEATURE_VERSION || incoming_hash != current_hash {
        return Err(LayoutMismatchError {
            expected_version: FEATURE_VERSION,
            expected_hash: current_hash,
            actual_version: incoming_version,
            actual_hash: incoming_hash,
        });
    }

    Ok(())
}

// ============================================================================
// FEATURE LOOKUP
// ============================================================================

/// Get feature index by name (O(n) but features are few)
pub fn feature_index(name: &str) -> Option<usize> {
    FEATURE_DEFS.iter().position(|d| d.name == name)
}

/// Get feature name by index
pub fn feature_name(index: usize) -> Option<&'static str> {
    FEATURE_DEFS.get(index).map(|d| d.name)
}

/// Raw input field names the mapper reads, in first-use order.
pub fn recognized_fields() -> Vec<&'static str> {
    let mut fields: Vec<&'static str> = Vec::new();
    for def in FEATURE_DEFS {
        if !fields.contains(&def.source) {
            fields.push(def.source);
        }
    }
    fields
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_feature_count() {
        assert_eq!(FEATURE_COUNT, 43);
        assert_eq!(FEATURE_DEFS.len(), FEATURE_COUNT);
    }

    #[test]
    fn test_feature_names_unique() {
        for (i, def) in FEATURE_DEFS.iter().enumerate() {
            assert_eq!(feature_index(def.name), Some(i), "duplicate name {}", def.name);
        }
    }

    #[test]
    fn test_layout_hash_consistency() {
        assert_eq!(compute_layout_hash(), compute_layout_hash());
        assert_eq!(layout_hash(), compute_layout_hash());
        assert_ne!(layout_hash(), 0);
    }

    #[test]
    fn test_validate_layout() {
        assert!(validate_layout(FEATURE_VERSION, layout_hash()).is_ok());
        assert!(validate_layout(FEATURE_VERSION + 1, layout_hash()).is_err());
        assert!(validate_layout(FEATURE_VERSION, layout_hash().wrapping_add(1)).is_err());
    }

    #[test]
    fn test_feature_lookup() {
        assert_eq!(feature_index("prom_duration_hours"), Some(0));
        assert_eq!(feature_index("pv_examinations_count"), Some(4));
        assert_eq!(feature_index("apgar5_respiration"), Some(42));
        assert_eq!(feature_index("nonexistent"), None);
        assert_eq!(feature_name(7), Some("prom_present_yes"));
        assert_eq!(feature_name(100), None);
    }

    #[test]
    fn test_flag_features_are_suffixed() {
        for def in FEATURE_DEFS.iter().filter(|d| d.kind == FeatureKind::Flag) {
            assert_eq!(def.name, format!("{}_yes", def.source));
        }
    }

    #[test]
    fn test_recognized_fields() {
        let fields = recognized_fields();
        assert!(fields.contains(&"feeding_status"));
        assert!(fields.contains(&"gestational_age_category"));
        assert_eq!(fields.iter().filter(|f| **f == "respiratory_distress").count(), 1);
        // 7 numeric + 18 flags + 5 categorical sources + 10 APGAR
        assert_eq!(fields.len(), 40);
    }

    #[test]
    fn test_layout_info() {
        let info = LayoutInfo::current();
        assert_eq!(info.version, FEATURE_VERSION);
        assert_eq!(info.feature_count, FEATURE_COUNT);
        assert_eq!(info.feature_names[25], "feeding_status_normal");
    }
}
