//! Ricegrain Policy
//!
//! Turns raw classifier output into the label shown to the user.
//!
//! Two policies are supported:
//! - `argmax`: the predicted class, never Uncertain
//! - `threshold`: a class only when its probability exceeds the threshold
//!   (default 0.8), otherwise Uncertain
//!
//! The decision comes with a two-bar probability chart for display.

pub mod chart;
pub mod engine;
pub mod policy;

pub use chart::{ChartBar, ProbabilityChart};
pub use engine::{Decision, DecisionEngine};
pub use policy::{
    argmax_label, threshold_label, DecisionConfig, LabelPolicy, PolicyKind, DEFAULT_THRESHOLD,
};

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::chart::ProbabilityChart;
    pub use crate::engine::{Decision, DecisionEngine};
    pub use crate::policy::{DecisionConfig, LabelPolicy};
}
