//! Model Artifacts - read-once inputs produced by the training build
//!
//! - `model.json`: classifier parameters and the two thresholds
//! - `feature_order.json`: trained feature order
//! - `shap_background.json`: attribution baseline rows in that order
//! - `manifest.json` (optional): SHA-256 digest per artifact file

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use ndarray::{Array1, Array2, ArrayView1, Axis};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use super::inference::{Classifier, LogisticModel};
use super::threshold::ThresholdConfig;
use crate::constants::{
    DEFAULT_BACKGROUND_FILE, DEFAULT_FEATURE_ORDER_FILE, DEFAULT_MANIFEST_FILE, DEFAULT_MODEL_FILE,
};
use crate::error::ArtifactError;

// ============================================================================
// MODEL ARTIFACT
// ============================================================================

/// Serialized classifier bundle (`model.json`)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelArtifact {
    pub model_type: String,
    #[serde(default)]
    pub version: String,
    pub intercept: f64,
    pub coefficients: Vec<f64>,
    pub threshold: f64,
    pub moderate_threshold: f64,
}

impl ModelArtifact {
    pub fn thresholds(&self) -> Result<ThresholdConfig, ArtifactError> {
        ThresholdConfig::new(self.threshold, self.moderate_threshold)
            .map_err(|reason| ArtifactError::invalid("model", reason))
    }

    pub fn classifier(&self) -> Result<Box<dyn Classifier>, ArtifactError> {
        match self.model_type.as_str() {
            "logistic_regression" | "linear" => {
                if !self.intercept.is_finite() || self.coefficients.iter().any(|w| !w.is_finite()) {
                    return Err(ArtifactError::invalid("model", "non-finite parameters"));
                }
                Ok(Box::new(LogisticModel::new(
                    self.intercept,
                    self.coefficients.clone(),
                )))
            }
            other => Err(ArtifactError::invalid(
                "model",
                format!("unsupported model_type '{}'", other),
            )),
        }
    }
}

// ============================================================================
// ATTRIBUTION BASELINE
// ============================================================================

/// Reference sample matrix (rows × trained features)
#[derive(Debug, Clone, PartialEq)]
pub struct AttributionBaseline {
    samples: Array2<f64>,
    mean: Array1<f64>,
}

impl AttributionBaseline {
    pub fn new(samples: Array2<f64>) -> Result<Self, String> {
        if samples.nrows() == 0 || samples.ncols() == 0 {
            return Err("baseline must contain at least one row and one feature".to_string());
        }
        if samples.iter().any(|v| !v.is_finite()) {
            return Err("baseline contains non-finite values".to_string());
        }

        let mean = samples
            .mean_axis(Axis(0))
            .ok_or_else(|| "baseline mean undefined".to_string())?;

        Ok(Self { samples, mean })
    }

    pub fn from_rows(rows: Vec<Vec<f64>>) -> Result<Self, String> {
        let n_rows = rows.len();
        let n_cols = rows.first().map_or(0, Vec::len);

        if let Some((i, row)) = rows.iter().enumerate().find(|(_, r)| r.len() != n_cols) {
            return Err(format!(
                "baseline row {} has {} values, expected {}",
                i,
                row.len(),
                n_cols
            ));
        }

        let flat: Vec<f64> = rows.into_iter().flatten().collect();
        let samples = Array2::from_shape_vec((n_rows, n_cols), flat).map_err(|e| e.to_string())?;
        Self::new(samples)
    }

    pub fn n_samples(&self) -> usize {
        self.samples.nrows()
    }

    pub fn n_features(&self) -> usize {
        self.samples.ncols()
    }

    /// Column means, in trained order
    pub fn mean(&self) -> ArrayView1<'_, f64> {
        self.mean.view()
    }
}

// ============================================================================
// PATHS
// ============================================================================

/// Locations of the artifact files
#[derive(Debug, Clone, PartialEq)]
pub struct ArtifactPaths {
    pub model: PathBuf,
    pub feature_order: PathBuf,
    pub background: PathBuf,
    /// Verified only when the file exists
    pub manifest: Option<PathBuf>,
}

impl ArtifactPaths {
    /// Default file names inside one directory
    pub fn in_dir(dir: impl AsRef<Path>) -> Self {
        let dir = dir.as_ref();
        Self {
            model: dir.join(DEFAULT_MODEL_FILE),
            feature_order: dir.join(DEFAULT_FEATURE_ORDER_FILE),
            background: dir.join(DEFAULT_BACKGROUND_FILE),
            manifest: Some(dir.join(DEFAULT_MANIFEST_FILE)),
        }
    }
}

// ============================================================================
// LOADING
// ============================================================================

/// Raw contents of all artifacts, validated only for syntax
#[derive(Debug, Clone)]
pub struct LoadedArtifacts {
    pub model: ModelArtifact,
    pub feature_order: Vec<String>,
    pub background: Vec<Vec<f64>>,
    /// file name → SHA-256 hex
    pub digests: BTreeMap<String, String>,
}

/// SHA-256 of a byte slice as lowercase hex
pub fn sha256_hex(bytes: &[u8]) -> String {
    hex::encode(Sha256::digest(bytes))
}

fn file_key(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

fn read_bytes(path: &Path) -> Result<Vec<u8>, ArtifactError> {
    fs::read(path).map_err(|source| ArtifactError::Io {
        path: path.to_path_buf(),
        source,
    })
}

fn parse<T: DeserializeOwned>(path: &Path, bytes: &[u8]) -> Result<T, ArtifactError> {
    serde_json::from_slice(bytes).map_err(|source| ArtifactError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

/// Read, hash and parse one artifact
fn read_artifact<T: DeserializeOwned>(
    path: &Path,
    digests: &mut BTreeMap<String, String>,
) -> Result<T, ArtifactError> {
    let bytes = read_bytes(path)?;
    let digest = sha256_hex(&bytes);
    log::info!("Loaded {} ({} bytes, sha256 {})", path.display(), bytes.len(), digest);
    digests.insert(file_key(path), digest);
    parse(path, &bytes)
}

/// Compare computed digests against the manifest, if one is present.
pub fn verify_manifest(
    manifest: &Path,
    digests: &BTreeMap<String, String>,
) -> Result<bool, ArtifactError> {
    if !manifest.exists() {
        log::info!("No artifact manifest at {}, skipping checksum verification", manifest.display());
        return Ok(false);
    }

    let expected: BTreeMap<String, String> = parse(manifest, &read_bytes(manifest)?)?;

    for (file, want) in &expected {
        let got = digests.get(file).ok_or_else(|| {
            ArtifactError::invalid("manifest", format!("lists unknown artifact '{}'", file))
        })?;

        if !got.eq_ignore_ascii_case(want.trim()) {
            return Err(ArtifactError::Checksum {
                path: PathBuf::from(file),
                expected: want.clone(),
                actual: got.clone(),
            });
        }
    }

    log::info!("Artifact manifest verified ({} entries)", expected.len());
    Ok(true)
}

/// Read every artifact file. Any failure is fatal for startup.
pub fn load_artifacts(paths: &ArtifactPaths) -> Result<LoadedArtifacts, ArtifactError> {
    let mut digests = BTreeMap::new();

    let model: ModelArtifact = read_artifact(&paths.model, &mut digests)?;
    let feature_order: Vec<String> = read_artifact(&paths.feature_order, &mut digests)?;
    let background: Vec<Vec<f64>> = read_artifact(&paths.background, &mut digests)?;

    if let Some(manifest) = &paths.manifest {
        verify_manifest(manifest, &digests)?;
    }

    Ok(LoadedArtifacts {
        model,
        feature_order,
        background,
        digests,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write(dir: &Path, name: &str, content: &str) {
        let mut file = fs::File::create(dir.join(name)).unwrap();
        file.write_all(content.as_bytes()).unwrap();
    }

    fn write_valid(dir: &Path) {
        write(
            dir,
            "model.json",
            r#"{"model_type": "logistic_regression", "version": "t1", "intercept": -1.0,
                "coefficients": [0.5, 1.0], "threshold": 0.5, "moderate_threshold": 0.3}"#,
        );
        write(dir, "feature_order.json", r#"["heart_rate_bpm", "apnea_present_yes"]"#);
        write(dir, "shap_background.json", "[[120.0, 0.0], [140.0, 1.0]]");
    }

    #[test]
    fn test_load_artifacts() {
        let dir = tempfile::tempdir().unwrap();
        write_valid(dir.path());

        let loaded = load_artifacts(&ArtifactPaths::in_dir(dir.path())).unwrap();
        assert_eq!(loaded.model.version, "t1");
        assert_eq!(loaded.feature_order.len(), 2);
        assert_eq!(loaded.background.len(), 2);
        assert_eq!(loaded.digests.len(), 3);
        assert_eq!(loaded.digests["model.json"].len(), 64);
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = load_artifacts(&ArtifactPaths::in_dir(dir.path())).unwrap_err();
        assert!(matches!(err, ArtifactError::Io { .. }));
    }

    #[test]
    fn test_malformed_json_is_parse_error() {
        let dir = tempfile::tempdir().unwrap();
        write_valid(dir.path());
        write(dir.path(), "feature_order.json", "{not json");

        let err = load_artifacts(&ArtifactPaths::in_dir(dir.path())).unwrap_err();
        assert!(matches!(err, ArtifactError::Parse { .. }));
    }

    #[test]
    fn test_manifest_verified() {
        let dir = tempfile::tempdir().unwrap();
        write_valid(dir.path());

        let digest = sha256_hex(&fs::read(dir.path().join("model.json")).unwrap());
        write(dir.path(), "manifest.json", &format!(r#"{{"model.json": "{}"}}"#, digest.to_uppercase()));
        assert!(load_artifacts(&ArtifactPaths::in_dir(dir.path())).is_ok());

        write(dir.path(), "manifest.json", &format!(r#"{{"model.json": "{}"}}"#, "0".repeat(64)));
        let err = load_artifacts(&ArtifactPaths::in_dir(dir.path())).unwrap_err();
        assert!(matches!(err, ArtifactError::Checksum { .. }));
    }

    #[test]
    fn test_manifest_unknown_entry() {
        let dir = tempfile::tempdir().unwrap();
        write_valid(dir.path());
        write(dir.path(), "manifest.json", r#"{"scaler.joblib": "abc"}"#);

        let err = load_artifacts(&ArtifactPaths::in_dir(dir.path())).unwrap_err();
        assert!(matches!(err, ArtifactError::Invalid { artifact: "manifest", .. }));
    }

    #[test]
    fn test_model_artifact_classifier() {
        let artifact = ModelArtifact {
            model_type: "gradient_boosting".to_string(),
            version: String::new(),
            intercept: 0.0,
            coefficients: vec![1.0],
            threshold: 0.5,
            moderate_threshold: 0.3,
        };
        assert!(artifact.classifier().is_err());

        let linear = ModelArtifact {
            model_type: "logistic_regression".to_string(),
            ..artifact.clone()
        };
        assert_eq!(linear.classifier().unwrap().n_features(), 1);

        let inverted = ModelArtifact {
            threshold: 0.2,
            ..linear
        };
        assert!(inverted.thresholds().is_err());
    }

    #[test]
    fn test_baseline_mean() {
        let baseline = AttributionBaseline::from_rows(vec![vec![1.0, 10.0], vec![3.0, 20.0]]).unwrap();
        assert_eq!(baseline.n_samples(), 2);
        assert_eq!(baseline.n_features(), 2);
        assert_eq!(baseline.mean().to_vec(), vec![2.0, 15.0]);
    }

    #[test]
    fn test_baseline_rejects_bad_shapes() {
        assert!(AttributionBaseline::from_rows(vec![]).is_err());
        assert!(AttributionBaseline::from_rows(vec![vec![1.0, 2.0], vec![1.0]]).is_err());
        assert!(AttributionBaseline::from_rows(vec![vec![f64::NAN]]).is_err());
    }
}
