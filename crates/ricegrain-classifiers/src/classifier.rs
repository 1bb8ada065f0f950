//! Classifier trait and common types

use ricegrain_core::{ClassProbabilities, FeatureVector, Result, RiceClass};
use std::time::Instant;

/// Trait for all rice grain classifiers.
///
/// Implementations are loaded once and shared read-only, so prediction
/// takes `&self` and must not mutate the model.
pub trait Classifier: Send + Sync {
    /// Predict the class label (0 = Cammeo, 1 = Osmancik)
    fn predict(&self, features: &FeatureVector) -> Result<RiceClass>;

    /// Predict the class probability pair
    fn predict_proba(&self, features: &FeatureVector) -> Result<ClassProbabilities>;

    /// Get the classifier name
    fn name(&self) -> &str;

    /// Run both predictions and record latency
    fn classify(&self, features: &FeatureVector) -> Result<ClassificationResult> {
        let start = Instant::now();

        let class = self.predict(features)?;
        let probabilities = self.predict_proba(features)?;

        Ok(ClassificationResult {
            class,
            probabilities,
            model: self.name().to_string(),
            latency_us: start.elapsed().as_micros() as u64,
        })
    }
}

/// Result of classification
#[derive(Debug, Clone)]
pub struct ClassificationResult {
    /// Predicted class
    pub class: RiceClass,

    /// Class probabilities
    pub probabilities: ClassProbabilities,

    /// Name of the classifier that produced the result
    pub model: String,

    /// Latency in microseconds
    pub latency_us: u64,
}
