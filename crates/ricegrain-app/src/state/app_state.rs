use metrics_exporter_prometheus::PrometheusHandle;
use ricegrain_classifiers::{LoadedModel, ModelProvider};
use ricegrain_core::{Error, FeatureVector, Result};
use ricegrain_policy::DecisionEngine;
use ricegrain_telemetry::MetricsCollector;
use std::sync::Arc;
use tracing::{info, warn};
use uuid::Uuid;

use crate::config::{AppConfig, ModelSource};
use crate::models::PredictResponse;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    /// Validated configuration
    pub config: Arc<AppConfig>,

    /// Owner of the memoized classifier
    pub provider: Arc<ModelProvider>,

    /// Label policy applied to every prediction
    pub engine: Arc<DecisionEngine>,

    /// Prediction counters for the stats endpoint
    pub metrics: MetricsCollector,

    /// Prometheus exporter, when one is installed
    pub prometheus: Option<PrometheusHandle>,
}

impl AppState {
    /// Build the state and load the classifier.
    ///
    /// Loading happens here so a strict-mode failure stops startup instead
    /// of surfacing on the first request.
    pub fn new(config: AppConfig) -> Result<Self> {
        let engine = DecisionEngine::new(config.decision.to_policy()?);
        let provider = build_provider(&config);

        let model = provider.load()?;
        if model.origin().is_degraded() {
            warn!("Serving predictions from a synthetic model; results are not meaningful");
        }
        info!(policy = %engine.policy(), origin = %model.origin(), "Application state ready");

        Ok(Self {
            config: Arc::new(config),
            provider: Arc::new(provider),
            engine: Arc::new(engine),
            metrics: MetricsCollector::new(),
            prometheus: None,
        })
    }

    pub fn with_prometheus(mut self, handle: PrometheusHandle) -> Self {
        self.prometheus = Some(handle);
        self
    }

    /// The memoized classifier
    pub fn model(&self) -> Result<LoadedModel> {
        self.provider.load()
    }

    /// Validate, classify and decide one grain
    pub fn predict(&self, features: FeatureVector) -> Result<PredictResponse> {
        let request_id = Uuid::new_v4().to_string();

        match self.predict_inner(request_id.clone(), features) {
            Ok(response) => Ok(response),
            Err(e) => {
                warn!(request_id = %request_id, "Prediction request failed: {}", e);
                self.metrics.record_error(error_kind(&e));
                Err(e)
            }
        }
    }

    fn predict_inner(&self, request_id: String, features: FeatureVector) -> Result<PredictResponse> {
        let features = features.validated(self.config.input.clamp_unit_range)?;
        let model = self.provider.load()?;
        let decision = self.engine.evaluate(model.classifier().as_ref(), &features)?;

        self.metrics.record_decision(decision.label, decision.latency_us);
        info!(
            request_id = %request_id,
            label = %decision.label,
            latency_us = decision.latency_us,
            "Prediction served"
        );

        Ok(PredictResponse::new(request_id, &decision, &model, features))
    }
}

fn build_provider(config: &AppConfig) -> ModelProvider {
    match config.model.source {
        ModelSource::Mock => ModelProvider::mock(),
        ModelSource::Artifact => {
            ModelProvider::from_path(config.model.path.clone(), config.model.fallback)
                .with_synthetic(config.model.synthetic.clone())
        }
    }
}

/// Short error name used as a metrics label
pub fn error_kind(err: &Error) -> &'static str {
    match err {
        Error::ModelLoad(_) => "model_load",
        Error::Prediction(_) => "prediction",
        Error::InvalidInput(_) => "invalid_input",
        Error::Config(_) => "config",
        Error::Io(_) => "io",
        Error::Serialization(_) => "serialization",
    }
}
