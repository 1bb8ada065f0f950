//! Response payloads shared by the HTTP API and the CLI

use ricegrain_classifiers::{FallbackPolicy, LoadedModel, ModelOrigin};
use ricegrain_core::{FeatureVector, Label, RiceClass, FEATURE_NAMES};
use ricegrain_policy::{Decision, PolicyKind, ProbabilityChart};
use serde::Serialize;
use std::collections::BTreeMap;

use crate::config::{AppConfig, ModelSource};

pub const CHART_DIV_ID: &str = "probability-chart";

/// Result of one prediction request
#[derive(Debug, Clone, Serialize)]
pub struct PredictResponse {
    pub request_id: String,

    /// Label shown to the user, possibly Uncertain
    pub label: Label,

    /// Success message carrying the label
    pub message: String,

    /// Class chosen by the classifier before the label policy
    pub predicted_class: RiceClass,

    /// Probability per class name
    pub probabilities: BTreeMap<&'static str, f64>,

    /// Features after range handling
    pub features: FeatureVector,

    pub chart: ProbabilityChart,

    /// Embeddable plotly fragment for the chart
    pub chart_html: String,

    pub model: String,
    pub origin: ModelOrigin,

    /// True when the classifier is the synthetic fallback
    pub degraded: bool,

    pub latency_us: u64,
}

impl PredictResponse {
    pub fn new(
        request_id: String,
        decision: &Decision,
        model: &LoadedModel,
        features: FeatureVector,
    ) -> Self {
        let chart = decision.chart();
        let chart_html = chart.to_inline_html(CHART_DIV_ID);
        let probabilities = [RiceClass::Cammeo, RiceClass::Osmancik]
            .into_iter()
            .map(|class| (class.as_str(), decision.probabilities.get(class)))
            .collect();

        Self {
            request_id,
            label: decision.label,
            message: decision.message(),
            predicted_class: decision.class,
            probabilities,
            features,
            chart,
            chart_html,
            model: decision.model.clone(),
            origin: model.origin().clone(),
            degraded: model.origin().is_degraded(),
            latency_us: decision.latency_us,
        }
    }
}

/// Active configuration plus information about the loaded model
#[derive(Debug, Clone, Serialize)]
pub struct ConfigResponse {
    pub decision: DecisionInfo,
    pub model: ModelInfo,
    pub clamp_unit_range: bool,
    pub about: Vec<&'static str>,
}

#[derive(Debug, Clone, Serialize)]
pub struct DecisionInfo {
    pub policy: PolicyKind,
    /// Only reported for the threshold policy
    pub threshold: Option<f64>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ModelInfo {
    pub source: ModelSource,
    pub path: String,
    pub fallback: FallbackPolicy,
    pub classifier: String,
    pub origin: ModelOrigin,
    pub degraded: bool,
}

impl ConfigResponse {
    pub fn new(config: &AppConfig, model: &LoadedModel) -> Self {
        let threshold = match config.decision.policy {
            PolicyKind::Argmax => None,
            PolicyKind::Threshold => Some(config.decision.threshold),
        };

        Self {
            decision: DecisionInfo {
                policy: config.decision.policy,
                threshold,
            },
            model: ModelInfo {
                source: config.model.source,
                path: config.model.path.display().to_string(),
                fallback: config.model.fallback,
                classifier: model.classifier().name().to_string(),
                origin: model.origin().clone(),
                degraded: model.origin().is_degraded(),
            },
            clamp_unit_range: config.input.clamp_unit_range,
            about: vec![
                "Predicts whether a rice grain is Cammeo or Osmancik from its morphological features",
                "Uses a random forest classifier",
                "Trained on Cammeo and Osmancik rice grain data",
            ],
        }
    }
}

/// Form field metadata
#[derive(Debug, Clone, Serialize)]
pub struct FieldInfo {
    /// Column name as used in named input
    pub name: &'static str,
    /// Human readable label
    pub label: &'static str,
    pub default: f64,
    pub min: f64,
    pub max: Option<f64>,
}

#[derive(Debug, Clone, Serialize)]
pub struct DefaultsResponse {
    pub features: FeatureVector,
    pub fields: Vec<FieldInfo>,
}

impl DefaultsResponse {
    pub fn new() -> Self {
        let features = FeatureVector::default();
        let labels = [
            "Area",
            "Perimeter",
            "Major Axis Length",
            "Minor Axis Length",
            "Eccentricity",
            "Convex Area",
            "Extent",
        ];

        let fields = FEATURE_NAMES
            .iter()
            .zip(labels)
            .zip(features.to_array())
            .map(|((&name, label), default)| FieldInfo {
                name,
                label,
                default,
                min: 0.0,
                max: matches!(name, "Eccentricity" | "Extent").then_some(1.0),
            })
            .collect();

        Self { features, fields }
    }
}

impl Default for DefaultsResponse {
    fn default() -> Self {
        Self::new()
    }
}
