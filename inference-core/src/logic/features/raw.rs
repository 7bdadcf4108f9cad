//! Raw Input - UI-level observations before mapping
//!
//! Every field is optional and loosely typed: the form may send `"yes"`,
//! `1` or `true` for the same flag. `RawValue` pins those shapes down and
//! the coercion functions here hold one normalization rule per field kind.

use std::collections::BTreeMap;

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::error::ValidationError;

// ============================================================================
// RAW VALUE
// ============================================================================

/// A single scalar supplied for an input field.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum RawValue {
    Bool(bool),
    Integer(i64),
    Float(f64),
    Text(String),
}

impl RawValue {
    /// Convert a JSON value. `null` becomes `None`; arrays and objects are
    /// kept as their JSON text so they fail numeric coercion and never
    /// match a flag or category.
    pub fn from_json(value: Value) -> Option<Self> {
        match value {
            Value::Null => None,
            Value::Bool(b) => Some(RawValue::Bool(b)),
            Value::Number(n) => Some(match n.as_i64() {
                Some(i) => RawValue::Integer(i),
                None => RawValue::Float(n.as_f64().unwrap_or(f64::NAN)),
            }),
            Value::String(s) => Some(RawValue::Text(s)),
            other => Some(RawValue::Text(other.to_string())),
        }
    }

    /// Affirmative answer: case-insensitive "yes", numeric 1 or `true`.
    pub fn is_affirmative(&self) -> bool {
        match self {
            RawValue::Bool(b) => *b,
            RawValue::Integer(i) => *i == 1,
            RawValue::Float(f) => *f == 1.0,
            RawValue::Text(s) => s.trim().eq_ignore_ascii_case("yes"),
        }
    }

    /// Category match against a recognized token (trimmed, case-insensitive).
    pub fn matches_category(&self, token: &str) -> bool {
        match self {
            RawValue::Text(s) => s.trim().to_lowercase() == token.to_lowercase(),
            _ => false,
        }
    }

    /// Render for error messages.
    pub fn to_display(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|_| format!("{:?}", self))
    }
}

impl From<bool> for RawValue {
    fn from(value: bool) -> Self {
        RawValue::Bool(value)
    }
}

impl From<i64> for RawValue {
    fn from(value: i64) -> Self {
        RawValue::Integer(value)
    }
}

impl From<i32> for RawValue {
    fn from(value: i32) -> Self {
        RawValue::Integer(value as i64)
    }
}

impl From<f64> for RawValue {
    fn from(value: f64) -> Self {
        RawValue::Float(value)
    }
}

impl From<&str> for RawValue {
    fn from(value: &str) -> Self {
        RawValue::Text(value.to_string())
    }
}

impl From<String> for RawValue {
    fn from(value: String) -> Self {
        RawValue::Text(value)
    }
}

// ============================================================================
// RAW INPUT RECORD
// ============================================================================

/// Field name → optional scalar. Unrecognized names are carried but ignored
/// by the mapper.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct RawInput {
    fields: BTreeMap<String, Option<RawValue>>,
}

impl RawInput {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style setter
    pub fn with(mut self, field: &str, value: impl Into<RawValue>) -> Self {
        self.insert(field, Some(value.into()));
        self
    }

    /// Explicit null for a field
    pub fn with_null(mut self, field: &str) -> Self {
        self.insert(field, None);
        self
    }

    pub fn insert(&mut self, field: &str, value: Option<RawValue>) {
        self.fields.insert(field.to_string(), value);
    }

    /// Value for a field; absent and null are both `None`.
    pub fn get(&self, field: &str) -> Option<&RawValue> {
        self.fields.get(field).and_then(|v| v.as_ref())
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

impl FromIterator<(String, Value)> for RawInput {
    fn from_iter<I: IntoIterator<Item = (String, Value)>>(iter: I) -> Self {
        Self {
            fields: iter
                .into_iter()
                .map(|(k, v)| (k, RawValue::from_json(v)))
                .collect(),
        }
    }
}

impl<'de> Deserialize<'de> for RawInput {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let map = BTreeMap::<String, Value>::deserialize(deserializer)?;
        Ok(map.into_iter().collect())
    }
}

// ============================================================================
// COERCION
// ============================================================================

fn invalid(field: &str, value: &RawValue, expected: &'static str) -> ValidationError {
    ValidationError {
        field: field.to_string(),
        value: value.to_display(),
        expected,
    }
}

/// Float passthrough. Absent, null, blank text and `false` are 0.0.
pub fn coerce_float(field: &str, value: Option<&RawValue>) -> Result<f64, ValidationError> {
    let Some(raw) = value else {
        return Ok(0.0);
    };

    let parsed = match raw {
        RawValue::Bool(b) => Some(if *b { 1.0 } else { 0.0 }),
        RawValue::Integer(i) => Some(*i as f64),
        RawValue::Float(f) => Some(*f),
        RawValue::Text(s) if s.trim().is_empty() => Some(0.0),
        RawValue::Text(s) => s.trim().parse::<f64>().ok(),
    };

    match parsed {
        Some(v) if v.is_finite() => Ok(v),
        _ => Err(invalid(field, raw, "float")),
    }
}

/// Integer passthrough. Fractional numbers truncate toward zero; text must
/// be a whole number.
pub fn coerce_integer(field: &str, value: Option<&RawValue>) -> Result<i64, ValidationError> {
    let Some(raw) = value else {
        return Ok(0);
    };

    let parsed = match raw {
        RawValue::Bool(b) => Some(*b as i64),
        RawValue::Integer(i) => Some(*i),
        RawValue::Float(f) if f.is_finite() && f.abs() < i64::MAX as f64 => Some(f.trunc() as i64),
        RawValue::Float(_) => None,
        RawValue::Text(s) if s.trim().is_empty() => Some(0),
        RawValue::Text(s) => s.trim().parse::<i64>().ok(),
    };

    parsed.ok_or_else(|| invalid(field, raw, "integer"))
}

/// Presence flag: 1 or 0, never an error.
pub fn coerce_flag(value: Option<&RawValue>) -> u8 {
    value.map_or(0, |v| v.is_affirmative() as u8)
}

/// One-hot indicator for a single category token.
pub fn coerce_indicator(value: Option<&RawValue>, token: &str) -> u8 {
    value.map_or(0, |v| v.matches_category(token) as u8)
}
