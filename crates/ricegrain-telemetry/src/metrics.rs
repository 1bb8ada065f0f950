//! Metrics collection and reporting

use chrono::{DateTime, Utc};
use ricegrain_core::Label;
use serde::Serialize;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tracing::trace;

/// Prometheus counter for decisions, labelled by displayed label
pub const PREDICTIONS_TOTAL: &str = "ricegrain_predictions_total";
/// Prometheus counter for failed prediction requests
pub const PREDICTION_ERRORS_TOTAL: &str = "ricegrain_prediction_errors_total";
/// Prometheus histogram of classifier latency
pub const PREDICTION_LATENCY_US: &str = "ricegrain_prediction_latency_us";

/// Metrics collector for prediction traffic
#[derive(Clone)]
pub struct MetricsCollector {
    inner: Arc<MetricsInner>,
}

struct MetricsInner {
    started_at: DateTime<Utc>,
    predictions: AtomicU64,
    cammeo: AtomicU64,
    osmancik: AtomicU64,
    uncertain: AtomicU64,
    prediction_errors: AtomicU64,
    total_latency_us: AtomicU64,
}

impl MetricsCollector {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(MetricsInner {
                started_at: Utc::now(),
                predictions: AtomicU64::new(0),
                cammeo: AtomicU64::new(0),
                osmancik: AtomicU64::new(0),
                uncertain: AtomicU64::new(0),
                prediction_errors: AtomicU64::new(0),
                total_latency_us: AtomicU64::new(0),
            }),
        }
    }

    /// Record a completed decision
    pub fn record_decision(&self, label: Label, latency_us: u64) {
        self.inner.predictions.fetch_add(1, Ordering::Relaxed);
        self.inner
            .total_latency_us
            .fetch_add(latency_us, Ordering::Relaxed);

        let per_label = match label {
            Label::Cammeo => &self.inner.cammeo,
            Label::Osmancik => &self.inner.osmancik,
            Label::Uncertain => &self.inner.uncertain,
        };
        per_label.fetch_add(1, Ordering::Relaxed);

        ::metrics::counter!(PREDICTIONS_TOTAL, "label" => label.as_str()).increment(1);
        ::metrics::histogram!(PREDICTION_LATENCY_US).record(latency_us as f64);
        trace!(label = %label, latency_us, "Recorded decision");
    }

    /// Record a request that produced no decision
    pub fn record_error(&self, kind: &'static str) {
        self.inner.prediction_errors.fetch_add(1, Ordering::Relaxed);
        ::metrics::counter!(PREDICTION_ERRORS_TOTAL, "kind" => kind).increment(1);
    }

    /// Get current metrics snapshot
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            started_at: self.inner.started_at,
            predictions: self.inner.predictions.load(Ordering::Relaxed),
            cammeo: self.inner.cammeo.load(Ordering::Relaxed),
            osmancik: self.inner.osmancik.load(Ordering::Relaxed),
            uncertain: self.inner.uncertain.load(Ordering::Relaxed),
            prediction_errors: self.inner.prediction_errors.load(Ordering::Relaxed),
            total_latency_us: self.inner.total_latency_us.load(Ordering::Relaxed),
        }
    }
}

impl Default for MetricsCollector {
    fn default() -> Self {
        Self::new()
    }
}

/// Snapshot of current metrics
#[derive(Debug, Clone, Serialize)]
pub struct MetricsSnapshot {
    pub started_at: DateTime<Utc>,
    pub predictions: u64,
    pub cammeo: u64,
    pub osmancik: u64,
    pub uncertain: u64,
    pub prediction_errors: u64,
    pub total_latency_us: u64,
}

impl MetricsSnapshot {
    /// Average classifier latency per decision
    pub fn avg_latency_us(&self) -> u64 {
        if self.predictions == 0 {
            0
        } else {
            self.total_latency_us / self.predictions
        }
    }

    /// Share of decisions shown as Uncertain
    pub fn uncertain_rate(&self) -> f64 {
        if self.predictions == 0 {
            0.0
        } else {
            self.uncertain as f64 / self.predictions as f64
        }
    }
}
