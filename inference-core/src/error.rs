//! Error types
//!
//! Request-scoped failures (`InferenceError`) are separate from startup
//! failures (`ArtifactError`); the latter must stop the process.

use std::path::PathBuf;

use thiserror::Error;

/// A supplied field could not be coerced to its declared numeric type.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("field '{field}': cannot interpret {value} as {expected}")]
pub struct ValidationError {
    pub field: String,
    /// Offending raw value, rendered as JSON.
    pub value: String,
    pub expected: &'static str,
}

/// The computed feature vector lacks features the model was trained on.
#[derive(Debug, Clone, PartialEq, Error)]
#[error(
    "feature vector (layout v{layout_version}, hash {layout_hash:08x}) is missing {} trained feature(s): {}",
    .missing.len(),
    .missing.join(", ")
)]
pub struct SchemaMismatchError {
    pub missing: Vec<String>,
    pub layout_version: u8,
    pub layout_hash: u32,
}

/// Failure of a single prediction request.
#[derive(Debug, Error)]
pub enum InferenceError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    SchemaMismatch(#[from] SchemaMismatchError),

    #[error("model error: {0}")]
    Model(String),
}

/// Failure while loading model artifacts at startup.
#[derive(Debug, Error)]
pub enum ArtifactError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("invalid artifact {artifact}: {reason}")]
    Invalid { artifact: &'static str, reason: String },

    #[error("checksum mismatch for {path}: expected {expected}, got {actual}")]
    Checksum {
        path: PathBuf,
        expected: String,
        actual: String,
    },
}

impl ArtifactError {
    pub(crate) fn invalid(artifact: &'static str, reason: impl Into<String>) -> Self {
        ArtifactError::Invalid {
            artifact,
            reason: reason.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_error_message() {
        let err = ValidationError {
            field: "pv_examinations_count".to_string(),
            value: "\"abc\"".to_string(),
            expected: "integer",
        };
        assert_eq!(
            err.to_string(),
            "field 'pv_examinations_count': cannot interpret \"abc\" as integer"
        );
    }

    #[test]
    fn test_schema_mismatch_lists_missing() {
        let err = SchemaMismatchError {
            missing: vec!["a".to_string(), "b".to_string()],
            layout_version: 1,
            layout_hash: 0xdeadbeef,
        };
        let msg = err.to_string();
        assert!(msg.contains("missing 2 trained feature(s): a, b"));
        assert!(msg.contains("deadbeef"));
    }

    #[test]
    fn test_inference_error_from() {
        let err: InferenceError = ValidationError {
            field: "x".to_string(),
            value: "1".to_string(),
            expected: "float",
        }
        .into();
        assert!(matches!(err, InferenceError::Validation(_)));
    }
}
