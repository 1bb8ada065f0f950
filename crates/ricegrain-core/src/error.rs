//! Error types for Ricegrain

/// Result type alias using Ricegrain's Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type for Ricegrain operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Model artifact missing, unreadable or corrupt
    #[error("model load error: {0}")]
    ModelLoad(String),

    /// Classifier failed while predicting
    #[error("prediction error: {0}")]
    Prediction(String),

    /// Feature input rejected before reaching the classifier
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// Configuration errors
    #[error("configuration error: {0}")]
    Config(String),

    /// Filesystem errors
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization errors
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl Error {
    /// Create a new model load error
    pub fn model_load(msg: impl Into<String>) -> Self {
        Self::ModelLoad(msg.into())
    }

    /// Create a new prediction error
    pub fn prediction(msg: impl Into<String>) -> Self {
        Self::Prediction(msg.into())
    }

    /// Create a new invalid input error
    pub fn invalid_input(msg: impl Into<String>) -> Self {
        Self::InvalidInput(msg.into())
    }

    /// Create a new configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }
}
