//! Feature Mapper - RawInput → FeatureVector
//!
//! Walks `FEATURE_DEFS` in order and applies the normalization rule for
//! each feature kind. No hidden state: the same input always yields the
//! same vector.

use super::layout::{FeatureKind, FEATURE_COUNT, FEATURE_DEFS};
use super::raw::{coerce_flag, coerce_float, coerce_indicator, coerce_integer, RawInput};
use super::vector::FeatureVector;
use crate::error::ValidationError;

/// Map a raw input record onto the full model feature layout.
///
/// Fails on the first field (in layout order) that cannot be coerced to
/// its numeric type; no partial vector is returned.
pub fn map_features(raw: &RawInput) -> Result<FeatureVector, ValidationError> {
    let mut values = [0.0f64; FEATURE_COUNT];

    for (slot, def) in values.iter_mut().zip(FEATURE_DEFS) {
        let value = raw.get(def.source);
        *slot = match def.kind {
            FeatureKind::Float => coerce_float(def.source, value)?,
            FeatureKind::Integer => coerce_integer(def.source, value)? as f64,
            FeatureKind::Flag => f64::from(coerce_flag(value)),
            FeatureKind::Category(token) => f64::from(coerce_indicator(value, token)),
        };
    }

    log::trace!("Mapped {} input fields onto {} features", raw.len(), FEATURE_COUNT);

    Ok(FeatureVector::from_values(values))
}
