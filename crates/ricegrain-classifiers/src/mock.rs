//! Fixed-rule stand-in classifier
//!
//! Lets the rest of the system run without any trained artifact. The rule
//! only looks at Area.

use ricegrain_core::{ClassProbabilities, FeatureVector, Result, RiceClass};

use crate::classifier::Classifier;

/// Area at or above which the mock predicts Osmancik
pub const MOCK_AREA_THRESHOLD: f64 = 13000.0;

/// Predicts Osmancik iff Area >= 13000
#[derive(Debug, Clone, Default)]
pub struct MockClassifier;

impl MockClassifier {
    pub const NAME: &'static str = "mock_area_threshold";

    pub fn new() -> Self {
        Self
    }

    fn class_for(features: &FeatureVector) -> RiceClass {
        if features.area >= MOCK_AREA_THRESHOLD {
            RiceClass::Osmancik
        } else {
            RiceClass::Cammeo
        }
    }
}

impl Classifier for MockClassifier {
    fn predict(&self, features: &FeatureVector) -> Result<RiceClass> {
        Ok(Self::class_for(features))
    }

    fn predict_proba(&self, features: &FeatureVector) -> Result<ClassProbabilities> {
        match Self::class_for(features) {
            RiceClass::Cammeo => ClassProbabilities::new(0.7, 0.3),
            RiceClass::Osmancik => ClassProbabilities::new(0.2, 0.8),
        }
    }

    fn name(&self) -> &str {
        Self::NAME
    }
}
