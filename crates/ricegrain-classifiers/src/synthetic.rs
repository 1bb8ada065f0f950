//! Throwaway classifier used when no trained artifact is available.
//!
//! The forest is fit on uniform random features and random labels, so it has
//! no predictive validity. It only keeps the form usable in demo contexts.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use ricegrain_core::{Result, FEATURE_COUNT};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::forest::{ForestParams, RandomForest};

/// Settings for the synthetic fallback model
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SyntheticConfig {
    /// Number of random training rows
    #[serde(default = "default_samples")]
    pub samples: usize,

    /// Trees in the fallback forest
    #[serde(default = "default_estimators")]
    pub n_estimators: usize,

    /// Seed for the data and the forest; unseeded runs differ every start
    #[serde(default)]
    pub seed: Option<u64>,
}

impl Default for SyntheticConfig {
    fn default() -> Self {
        Self {
            samples: default_samples(),
            n_estimators: default_estimators(),
            seed: None,
        }
    }
}

fn default_samples() -> usize {
    100
}

fn default_estimators() -> usize {
    100
}

/// Random training set: features uniform in [0, 1), labels uniform in {0, 1}
pub fn random_training_set(
    samples: usize,
    rng: &mut impl Rng,
) -> (Vec<[f64; FEATURE_COUNT]>, Vec<usize>) {
    let x = (0..samples)
        .map(|_| std::array::from_fn(|_| rng.gen::<f64>()))
        .collect();
    let y = (0..samples).map(|_| rng.gen_range(0..2)).collect();
    (x, y)
}

/// Fit the fallback forest
pub fn synthesize(config: &SyntheticConfig) -> Result<RandomForest> {
    let mut rng = match config.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };

    let (x, y) = random_training_set(config.samples, &mut rng);
    debug!(
        samples = config.samples,
        n_estimators = config.n_estimators,
        "Fitting synthetic fallback forest"
    );

    let params = ForestParams {
        n_estimators: config.n_estimators,
        random_state: Some(rng.gen()),
        ..Default::default()
    };
    RandomForest::fit(&x, &y, &params)
}
