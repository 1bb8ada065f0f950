//! Application configuration

use ricegrain_classifiers::{FallbackPolicy, SyntheticConfig};
use ricegrain_core::{Error, Result};
use ricegrain_policy::{DecisionConfig, PolicyKind};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::cli::ModelArgs;

/// Application configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Listen settings for `serve`
    #[serde(default)]
    pub server: ServerConfig,

    /// Where the classifier comes from
    #[serde(default)]
    pub model: ModelConfig,

    /// How classifier output becomes a label
    #[serde(default)]
    pub decision: DecisionConfig,

    /// Input range handling
    #[serde(default)]
    pub input: InputConfig,
}

impl AppConfig {
    /// Load configuration from file and CLI overrides
    pub fn load(config_path: &str, args: &ModelArgs) -> Result<Self> {
        // Try to load from file, or use defaults
        let mut config = if Path::new(config_path).exists() {
            let content = std::fs::read_to_string(config_path)?;
            Self::from_yaml(&content)?
        } else {
            Self::default()
        };

        config.apply_overrides(args);
        config.validate()?;
        Ok(config)
    }

    pub fn from_yaml(content: &str) -> Result<Self> {
        serde_yaml::from_str(content)
            .map_err(|e| Error::config(format!("invalid configuration file: {}", e)))
    }

    /// Apply CLI overrides on top of file values
    pub fn apply_overrides(&mut self, args: &ModelArgs) {
        if let Some(path) = &args.model {
            self.model.path = path.clone();
        }

        if let Some(source) = args.source {
            self.model.source = source;
        }

        if let Some(fallback) = args.fallback {
            self.model.fallback = fallback;
        }

        if let Some(policy) = args.policy {
            self.decision.policy = policy;
        }

        if let Some(threshold) = args.threshold {
            self.decision.threshold = threshold;
            // A threshold on the command line implies the threshold policy
            if args.policy.is_none() {
                self.decision.policy = PolicyKind::Threshold;
            }
        }

        if let Some(seed) = args.seed {
            self.model.synthetic.seed = Some(seed);
        }
    }

    pub fn validate(&self) -> Result<()> {
        self.decision.to_policy()?;

        if self.model.synthetic.samples < 2 {
            return Err(Error::config("model.synthetic.samples must be at least 2"));
        }
        if self.model.synthetic.n_estimators == 0 {
            return Err(Error::config("model.synthetic.n_estimators must be positive"));
        }

        Ok(())
    }
}

/// Listen settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_address")]
    pub address: String,

    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            address: default_address(),
            port: default_port(),
        }
    }
}

/// Classifier source settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelConfig {
    #[serde(default)]
    pub source: ModelSource,

    /// Artifact path, read once on first load
    #[serde(default = "default_model_path")]
    pub path: PathBuf,

    #[serde(default)]
    pub fallback: FallbackPolicy,

    /// Fallback model settings for the permissive policy
    #[serde(default)]
    pub synthetic: SyntheticConfig,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            source: ModelSource::default(),
            path: default_model_path(),
            fallback: FallbackPolicy::default(),
            synthetic: SyntheticConfig::default(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ModelSource {
    /// Persisted random forest artifact
    #[default]
    Artifact,
    /// Fixed Area rule, no artifact needed
    Mock,
}

impl std::str::FromStr for ModelSource {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "artifact" => Ok(Self::Artifact),
            "mock" => Ok(Self::Mock),
            _ => Err(format!(
                "Unknown model source: {}. Expected 'artifact' or 'mock'",
                s
            )),
        }
    }
}

/// Input range handling
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InputConfig {
    /// Clamp Eccentricity and Extent into [0, 1] instead of rejecting them
    #[serde(default = "default_true")]
    pub clamp_unit_range: bool,
}

impl Default for InputConfig {
    fn default() -> Self {
        Self {
            clamp_unit_range: true,
        }
    }
}

fn default_address() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    3000
}

fn default_model_path() -> PathBuf {
    PathBuf::from("./model.json")
}

fn default_true() -> bool {
    true
}
