//! Model provider: loads the classifier once and hands out shared handles.
//!
//! The provider is an explicitly owned object. The first successful
//! [`ModelProvider::load`] is memoized for the lifetime of the provider;
//! later calls never touch storage again. Strict load failures are not
//! memoized.

use parking_lot::Mutex;
use ricegrain_core::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, warn};

use crate::artifact::{ArtifactStore, FileStore, ModelArtifact};
use crate::classifier::Classifier;
use crate::mock::MockClassifier;
use crate::synthetic::{self, SyntheticConfig};

/// What to do when the artifact cannot be loaded
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FallbackPolicy {
    /// Synthesize a throwaway classifier so the interface stays usable
    #[default]
    Permissive,
    /// Surface the load failure; no predictions are possible
    Strict,
}

impl std::str::FromStr for FallbackPolicy {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "permissive" => Ok(Self::Permissive),
            "strict" => Ok(Self::Strict),
            _ => Err(format!(
                "Unknown fallback policy: {}. Expected 'permissive' or 'strict'",
                s
            )),
        }
    }
}

/// Where the active classifier came from
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ModelOrigin {
    /// Deserialized from a persisted artifact
    Artifact { location: String },
    /// Fit on random data after the artifact failed to load
    Synthetic { reason: String },
    /// Fixed-rule stand-in
    Mock,
}

impl ModelOrigin {
    /// True when predictions carry no real signal
    pub fn is_degraded(&self) -> bool {
        matches!(self, Self::Synthetic { .. })
    }
}

impl fmt::Display for ModelOrigin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Artifact { location } => write!(f, "artifact ({})", location),
            Self::Synthetic { .. } => f.write_str("synthetic fallback"),
            Self::Mock => f.write_str("mock"),
        }
    }
}

/// A loaded classifier and its provenance
#[derive(Clone)]
pub struct LoadedModel {
    classifier: Arc<dyn Classifier>,
    origin: ModelOrigin,
}

impl LoadedModel {
    pub fn new(classifier: Arc<dyn Classifier>, origin: ModelOrigin) -> Self {
        Self { classifier, origin }
    }

    pub fn classifier(&self) -> &Arc<dyn Classifier> {
        &self.classifier
    }

    pub fn origin(&self) -> &ModelOrigin {
        &self.origin
    }

    /// Check whether two handles share the same classifier instance
    pub fn same_instance(&self, other: &LoadedModel) -> bool {
        Arc::ptr_eq(&self.classifier, &other.classifier)
    }
}

impl fmt::Debug for LoadedModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoadedModel")
            .field("classifier", &self.classifier.name())
            .field("origin", &self.origin)
            .finish()
    }
}

enum ProviderSource {
    Store(Arc<dyn ArtifactStore>),
    Mock,
}

/// Memoizing owner of the application's classifier
pub struct ModelProvider {
    source: ProviderSource,
    fallback: FallbackPolicy,
    synthetic: SyntheticConfig,
    cached: Mutex<Option<LoadedModel>>,
}

impl ModelProvider {
    /// Provider reading from an arbitrary artifact store
    pub fn from_store(store: Arc<dyn ArtifactStore>, fallback: FallbackPolicy) -> Self {
        Self {
            source: ProviderSource::Store(store),
            fallback,
            synthetic: SyntheticConfig::default(),
            cached: Mutex::new(None),
        }
    }

    /// Provider reading an artifact file
    pub fn from_path(path: impl Into<PathBuf>, fallback: FallbackPolicy) -> Self {
        Self::from_store(Arc::new(FileStore::new(path)), fallback)
    }

    /// Provider serving the fixed-rule mock classifier
    pub fn mock() -> Self {
        Self {
            source: ProviderSource::Mock,
            fallback: FallbackPolicy::Strict,
            synthetic: SyntheticConfig::default(),
            cached: Mutex::new(None),
        }
    }

    /// Override the synthetic fallback settings
    pub fn with_synthetic(mut self, synthetic: SyntheticConfig) -> Self {
        self.synthetic = synthetic;
        self
    }

    pub fn fallback_policy(&self) -> FallbackPolicy {
        self.fallback
    }

    /// Whether a classifier is already memoized
    pub fn is_loaded(&self) -> bool {
        self.cached.lock().is_some()
    }

    /// Load the classifier, or return the memoized one
    pub fn load(&self) -> Result<LoadedModel> {
        let mut cached = self.cached.lock();
        if let Some(model) = cached.as_ref() {
            return Ok(model.clone());
        }

        let model = self.load_uncached()?;
        info!(
            classifier = model.classifier.name(),
            origin = %model.origin,
            "Model ready"
        );
        *cached = Some(model.clone());
        Ok(model)
    }

    fn load_uncached(&self) -> Result<LoadedModel> {
        let store = match &self.source {
            ProviderSource::Mock => {
                return Ok(LoadedModel::new(
                    Arc::new(MockClassifier::new()),
                    ModelOrigin::Mock,
                ))
            }
            ProviderSource::Store(store) => store,
        };

        match Self::load_artifact(store.as_ref()) {
            Ok(model) => Ok(model),
            Err(e) => match self.fallback {
                FallbackPolicy::Strict => Err(e),
                FallbackPolicy::Permissive => {
                    warn!(
                        "Model artifact unavailable ({}), synthesizing a fallback classifier with no predictive validity",
                        e
                    );
                    let forest = synthetic::synthesize(&self.synthetic).map_err(|se| {
                        Error::model_load(format!("fallback synthesis failed: {}", se))
                    })?;
                    Ok(LoadedModel::new(
                        Arc::new(forest),
                        ModelOrigin::Synthetic {
                            reason: e.to_string(),
                        },
                    ))
                }
            },
        }
    }

    fn load_artifact(store: &dyn ArtifactStore) -> Result<LoadedModel> {
        let location = store.location();
        info!("Loading model artifact from {}", location);

        let bytes = store.read()?;
        let artifact = ModelArtifact::from_slice(&bytes)?;

        Ok(LoadedModel::new(
            Arc::new(artifact.model),
            ModelOrigin::Artifact { location },
        ))
    }
}
