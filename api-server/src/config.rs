//! Configuration module

use std::env;
use std::path::PathBuf;

use septoctor_core::constants::{
    DEFAULT_BACKGROUND_FILE, DEFAULT_FEATURE_ORDER_FILE, DEFAULT_MANIFEST_FILE, DEFAULT_MODEL_FILE,
    DEFAULT_TOP_N,
};
use septoctor_core::ArtifactPaths;

/// Application configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Server port
    pub port: u16,

    /// Directory holding the model artifacts
    pub artifacts_dir: PathBuf,

    pub model_file: String,
    pub feature_order_file: String,
    pub background_file: String,

    /// Checksum manifest, verified only when present
    pub manifest_file: String,

    /// Top contributors returned when the request does not ask
    pub default_top_n: usize,

    /// Environment (development, production)
    pub environment: String,

    /// Emit JSON log lines
    pub json_logs: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            port: 8000,
            artifacts_dir: PathBuf::from("artifacts"),
            model_file: DEFAULT_MODEL_FILE.to_string(),
            feature_order_file: DEFAULT_FEATURE_ORDER_FILE.to_string(),
            background_file: DEFAULT_BACKGROUND_FILE.to_string(),
            manifest_file: DEFAULT_MANIFEST_FILE.to_string(),
            default_top_n: DEFAULT_TOP_N,
            environment: "development".to_string(),
            json_logs: false,
        }
    }
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Self {
        let defaults = Self::default();

        Self {
            port: env::var("PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(defaults.port),

            artifacts_dir: env::var("ARTIFACTS_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.artifacts_dir),

            model_file: env::var("MODEL_FILE").unwrap_or(defaults.model_file),

            feature_order_file: env::var("FEATURE_ORDER_FILE")
                .unwrap_or(defaults.feature_order_file),

            background_file: env::var("BACKGROUND_FILE").unwrap_or(defaults.background_file),

            manifest_file: env::var("MANIFEST_FILE").unwrap_or(defaults.manifest_file),

            default_top_n: env::var("DEFAULT_TOP_N")
                .ok()
                .and_then(|n| n.parse().ok())
                .filter(|n| (1..=DEFAULT_TOP_N).contains(n))
                .unwrap_or(defaults.default_top_n),

            environment: env::var("ENVIRONMENT").unwrap_or(defaults.environment),

            json_logs: env::var("LOG_FORMAT")
                .map(|f| f.eq_ignore_ascii_case("json"))
                .unwrap_or(false),
        }
    }

    /// Check if running in production
    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }

    /// Resolved artifact locations
    pub fn artifact_paths(&self) -> ArtifactPaths {
        ArtifactPaths {
            model: self.artifacts_dir.join(&self.model_file),
            feature_order: self.artifacts_dir.join(&self.feature_order_file),
            background: self.artifacts_dir.join(&self.background_file),
            manifest: Some(self.artifacts_dir.join(&self.manifest_file)),
        }
    }
}
