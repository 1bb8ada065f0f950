//! Ricegrain Core
//!
//! Core types and error handling shared across Ricegrain components.
//!
//! This crate provides:
//! - The fixed seven-measurement feature vector and its input conventions
//! - Class, probability and label types
//! - Error types and result handling

pub mod error;
pub mod types;

pub use error::{Error, Result};
pub use types::{
    ClassProbabilities, FeatureInput, FeatureVector, Label, RiceClass, FEATURE_COUNT,
    FEATURE_NAMES,
};

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::error::{Error, Result};
    pub use crate::types::{ClassProbabilities, FeatureVector, Label, RiceClass};
}
