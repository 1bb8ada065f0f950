//! Ricegrain Telemetry
//!
//! Prediction counters for the classifier service. Counts are kept in
//! process for the stats endpoint and mirrored to the `metrics` facade for
//! whichever exporter the binary installs.

pub mod metrics;

pub use crate::metrics::{MetricsCollector, MetricsSnapshot};

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::metrics::{MetricsCollector, MetricsSnapshot};
}
