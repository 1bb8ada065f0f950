//! Ricegrain Classifiers
//!
//! Binary rice variety classifiers over seven grain measurements, and the
//! provider that owns the application's classifier.
//!
//! - [`RandomForest`]: the model persisted in artifacts, also used for the
//!   synthetic fallback
//! - [`MockClassifier`]: fixed Area rule for running without any artifact
//! - [`ModelProvider`]: load once, memoize, apply the fallback policy

pub mod artifact;
pub mod classifier;
pub mod forest;
pub mod mock;
pub mod provider;
pub mod synthetic;

pub use artifact::{ArtifactStore, FileStore, ModelArtifact, ModelKind, ARTIFACT_FORMAT_VERSION};
pub use classifier::{ClassificationResult, Classifier};
pub use forest::{ForestParams, RandomForest, TreeNode};
pub use mock::{MockClassifier, MOCK_AREA_THRESHOLD};
pub use provider::{FallbackPolicy, LoadedModel, ModelOrigin, ModelProvider};
pub use synthetic::SyntheticConfig;

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::classifier::{ClassificationResult, Classifier};
    pub use crate::mock::MockClassifier;
    pub use crate::provider::{FallbackPolicy, LoadedModel, ModelOrigin, ModelProvider};
}
