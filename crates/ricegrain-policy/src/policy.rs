//! Label decision policies

use ricegrain_core::{ClassProbabilities, Error, Label, Result, RiceClass};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Confidence a class must exceed before the threshold policy commits to it
pub const DEFAULT_THRESHOLD: f64 = 0.8;

/// Rule converting classifier output into the displayed label
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum LabelPolicy {
    /// Map the predicted class directly; never Uncertain
    Argmax,
    /// Commit to a class only when its probability strictly exceeds the
    /// threshold, otherwise Uncertain
    Threshold(f64),
}

impl LabelPolicy {
    /// Threshold policy, rejecting thresholds outside [0.5, 1.0].
    ///
    /// Below 0.5 both probabilities could exceed the threshold at once.
    pub fn threshold(threshold: f64) -> Result<Self> {
        if !(0.5..=1.0).contains(&threshold) {
            return Err(Error::config(format!(
                "decision threshold must be within [0.5, 1.0], got {}",
                threshold
            )));
        }
        Ok(Self::Threshold(threshold))
    }

    /// Decide the label for one prediction
    pub fn decide(&self, class: RiceClass, probabilities: &ClassProbabilities) -> Label {
        match self {
            Self::Argmax => argmax_label(class),
            Self::Threshold(threshold) => threshold_label(probabilities, *threshold),
        }
    }

    pub fn kind(&self) -> PolicyKind {
        match self {
            Self::Argmax => PolicyKind::Argmax,
            Self::Threshold(_) => PolicyKind::Threshold,
        }
    }

    /// Threshold in effect, if any
    pub fn threshold_value(&self) -> Option<f64> {
        match self {
            Self::Argmax => None,
            Self::Threshold(threshold) => Some(*threshold),
        }
    }
}

impl Default for LabelPolicy {
    fn default() -> Self {
        Self::Argmax
    }
}

impl fmt::Display for LabelPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Argmax => f.write_str("argmax"),
            Self::Threshold(threshold) => write!(f, "threshold({})", threshold),
        }
    }
}

/// Argmax mapping: class 0 is Cammeo, class 1 is Osmancik
pub fn argmax_label(class: RiceClass) -> Label {
    Label::from(class)
}

/// Threshold-gated mapping with strict inequality
pub fn threshold_label(probabilities: &ClassProbabilities, threshold: f64) -> Label {
    if probabilities.cammeo() > threshold {
        Label::Cammeo
    } else if probabilities.osmancik() > threshold {
        Label::Osmancik
    } else {
        Label::Uncertain
    }
}

/// Policy names as written in configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PolicyKind {
    #[default]
    Argmax,
    Threshold,
}

impl std::str::FromStr for PolicyKind {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "argmax" => Ok(Self::Argmax),
            "threshold" => Ok(Self::Threshold),
            _ => Err(format!(
                "Unknown label policy: {}. Expected 'argmax' or 'threshold'",
                s
            )),
        }
    }
}

/// Decision settings as loaded from configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DecisionConfig {
    /// Which label policy to apply
    #[serde(default)]
    pub policy: PolicyKind,

    /// Threshold for the threshold policy; ignored by argmax
    #[serde(default = "default_threshold")]
    pub threshold: f64,
}

impl Default for DecisionConfig {
    fn default() -> Self {
        Self {
            policy: PolicyKind::default(),
            threshold: DEFAULT_THRESHOLD,
        }
    }
}

impl DecisionConfig {
    /// Build the configured policy
    pub fn to_policy(&self) -> Result<LabelPolicy> {
        match self.policy {
            PolicyKind::Argmax => Ok(LabelPolicy::Argmax),
            PolicyKind::Threshold => LabelPolicy::threshold(self.threshold),
        }
    }
}

fn default_threshold() -> f64 {
    DEFAULT_THRESHOLD
}
