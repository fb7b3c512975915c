use market_data_loader::{LoadError, ParseError, providers::ProviderError};
use thiserror::Error;

use crate::{config::RunConfigError, model::InvalidModelSpec};

/// Failures while fitting or evaluating a model.
#[derive(Debug, Error)]
pub enum TrainingError {
    /// Too few feature rows to form both a training and a test partition.
    #[error("need at least {required} feature rows to train, got {actual}")]
    NotEnoughRows { required: usize, actual: usize },

    /// The least-squares system had no unique solution.
    #[error("normal equations are singular")]
    SingularSystem,

    /// A fitted model produced a NaN or infinite prediction.
    #[error("model produced a non-finite prediction at test row {row}")]
    NonFinitePrediction { row: usize },

    /// Feature matrix shape did not match the model.
    #[error("expected {expected} feature columns, got {actual}")]
    ShapeMismatch { expected: usize, actual: usize },
}

/// Everything a pipeline run can fail with.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// The uploaded table was malformed.
    #[error("could not parse uploaded data: {0}")]
    Parse(#[from] ParseError),

    /// Remote data was unavailable or empty.
    #[error("could not fetch price history: {0}")]
    Fetch(#[from] ProviderError),

    /// Fewer raw price points than a run needs.
    #[error("need at least {required} price rows, got {actual}")]
    InsufficientData { required: usize, actual: usize },

    #[error("training failed: {0}")]
    Training(#[from] TrainingError),

    /// Hyperparameters or run settings out of range.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

impl From<LoadError> for PipelineError {
    fn from(err: LoadError) -> Self {
        match err {
            LoadError::Parse(e) => PipelineError::Parse(e),
            LoadError::Fetch(e) => PipelineError::Fetch(e),
        }
    }
}

impl From<InvalidModelSpec> for PipelineError {
    fn from(err: InvalidModelSpec) -> Self {
        PipelineError::InvalidConfig(err.to_string())
    }
}

impl From<RunConfigError> for PipelineError {
    fn from(err: RunConfigError) -> Self {
        PipelineError::InvalidConfig(err.to_string())
    }
}
