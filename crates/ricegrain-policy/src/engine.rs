//! Decision engine: one prediction request from features to label

use ricegrain_classifiers::Classifier;
use ricegrain_core::{ClassProbabilities, Error, FeatureVector, Label, Result, RiceClass};
use serde::Serialize;
use tracing::{debug, warn};

use crate::chart::ProbabilityChart;
use crate::policy::LabelPolicy;

/// Applies a label policy to classifier output
#[derive(Debug, Clone, Default)]
pub struct DecisionEngine {
    policy: LabelPolicy,
}

impl DecisionEngine {
    pub fn new(policy: LabelPolicy) -> Self {
        Self { policy }
    }

    pub fn policy(&self) -> &LabelPolicy {
        &self.policy
    }

    /// Classify one grain and decide its label.
    ///
    /// Any classifier failure is reported as [`Error::Prediction`]; no
    /// partial decision is produced.
    pub fn evaluate(&self, classifier: &dyn Classifier, features: &FeatureVector) -> Result<Decision> {
        let result = classifier.classify(features).map_err(|e| {
            warn!(classifier = classifier.name(), "Prediction failed: {}", e);
            match e {
                Error::Prediction(_) => e,
                other => Error::prediction(other.to_string()),
            }
        })?;

        let label = self.policy.decide(result.class, &result.probabilities);
        debug!(
            classifier = %result.model,
            class = %result.class,
            label = %label,
            latency_us = result.latency_us,
            "Decision made"
        );

        Ok(Decision {
            label,
            class: result.class,
            probabilities: result.probabilities,
            model: result.model,
            latency_us: result.latency_us,
        })
    }
}

/// Outcome of one prediction request
#[derive(Debug, Clone, Serialize)]
pub struct Decision {
    /// Label shown to the user
    pub label: Label,

    /// Class predicted by the classifier
    pub class: RiceClass,

    /// Class probabilities
    pub probabilities: ClassProbabilities,

    /// Classifier that produced the prediction
    pub model: String,

    /// Classifier latency in microseconds
    pub latency_us: u64,
}

impl Decision {
    /// Success message carrying the literal label
    pub fn message(&self) -> String {
        format!("The predicted rice type is: **{}**", self.label)
    }

    pub fn chart(&self) -> ProbabilityChart {
        ProbabilityChart::new(&self.probabilities)
    }
}
