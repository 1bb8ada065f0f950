//! Persisted model artifacts and where they are read from

use ricegrain_core::{Error, Result, FEATURE_NAMES};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::forest::RandomForest;

/// Artifact format version written by this crate
pub const ARTIFACT_FORMAT_VERSION: u32 = 1;

/// Serialized classifier envelope.
///
/// `feature_names` records the column order the model was trained with and
/// must match [`FEATURE_NAMES`] exactly.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelArtifact {
    pub format_version: u32,

    pub kind: ModelKind,

    pub feature_names: Vec<String>,

    pub model: RandomForest,
}

/// Model families an artifact may contain
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ModelKind {
    RandomForest,
}

impl ModelArtifact {
    /// Wrap a forest with the current format version and column order
    pub fn random_forest(forest: RandomForest) -> Self {
        Self {
            format_version: ARTIFACT_FORMAT_VERSION,
            kind: ModelKind::RandomForest,
            feature_names: FEATURE_NAMES.iter().map(|s| s.to_string()).collect(),
            model: forest,
        }
    }

    /// Decode and validate artifact bytes
    pub fn from_slice(bytes: &[u8]) -> Result<Self> {
        let artifact: Self = serde_json::from_slice(bytes)
            .map_err(|e| Error::model_load(format!("corrupt model artifact: {}", e)))?;
        artifact.validate()?;
        Ok(artifact)
    }

    /// Check version, column order and model structure
    pub fn validate(&self) -> Result<()> {
        if self.format_version != ARTIFACT_FORMAT_VERSION {
            return Err(Error::model_load(format!(
                "unsupported artifact format version {} (expected {})",
                self.format_version, ARTIFACT_FORMAT_VERSION
            )));
        }

        if self.feature_names.len() != FEATURE_NAMES.len()
            || self
                .feature_names
                .iter()
                .zip(FEATURE_NAMES.iter())
                .any(|(have, want)| have != want)
        {
            return Err(Error::model_load(format!(
                "artifact columns {:?} do not match expected {:?}",
                self.feature_names, FEATURE_NAMES
            )));
        }

        self.model.validate()
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    /// Write the artifact to a file
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        std::fs::write(path, self.to_json()?)?;
        Ok(())
    }
}

/// Storage holding a single serialized model
pub trait ArtifactStore: Send + Sync {
    /// Read the raw artifact bytes
    fn read(&self) -> Result<Vec<u8>>;

    /// Human readable location for logs and the about panel
    fn location(&self) -> String;
}

/// Artifact stored in a file on the local file system
#[derive(Debug, Clone)]
pub struct FileStore {
    path: PathBuf,
}

impl FileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl ArtifactStore for FileStore {
    fn read(&self) -> Result<Vec<u8>> {
        if !self.path.exists() {
            return Err(Error::model_load(format!(
                "model file not found: {}",
                self.path.display()
            )));
        }
        std::fs::read(&self.path).map_err(|e| {
            Error::model_load(format!("failed to read {}: {}", self.path.display(), e))
        })
    }

    fn location(&self) -> String {
        self.path.display().to_string()
    }
}
