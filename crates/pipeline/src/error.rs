//! Pipeline Error Types

use image_preprocess::PreprocessError;
use inference_engine::InferenceError;
use ranker::RankError;
use thiserror::Error;

/// Failure of any pipeline stage, wrapped without losing the stage's error
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error(transparent)]
    Preprocess(#[from] PreprocessError),

    #[error(transparent)]
    Inference(#[from] InferenceError),

    #[error(transparent)]
    Rank(#[from] RankError),

    /// Invalid or unreadable configuration
    #[error("Configuration error: {0}")]
    Config(String),
}

impl From<::config::ConfigError> for PipelineError {
    fn from(err: ::config::ConfigError) -> Self {
        PipelineError::Config(err.to_string())
    }
}

/// Flat error taxonomy for callers that only need to branch on the cause
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    ModelNotFound,
    ModelLoad,
    ImageLoad,
    ImageDecode,
    ShapeMismatch,
    Inference,
    LabelMismatch,
    Config,
}

impl ErrorKind {
    /// Whether the error leaves no usable pipeline (as opposed to failing one call)
    pub fn is_fatal(&self) -> bool {
        matches!(self, ErrorKind::ModelNotFound | ErrorKind::ModelLoad | ErrorKind::Config)
    }

    /// Configuration bugs an operator has to fix
    pub fn is_misconfiguration(&self) -> bool {
        matches!(
            self,
            ErrorKind::ShapeMismatch | ErrorKind::LabelMismatch | ErrorKind::Config
        )
    }
}

impl PipelineError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            PipelineError::Preprocess(e) => match e {
                PreprocessError::ImageLoad { .. } => ErrorKind::ImageLoad,
                PreprocessError::ImageDecode(_) | PreprocessError::InvalidTensor(_) => ErrorKind::ImageDecode,
                PreprocessError::InvalidTargetSize { .. } => ErrorKind::Config,
            },
            PipelineError::Inference(e) => match e {
                InferenceError::ModelNotFound(_) => ErrorKind::ModelNotFound,
                InferenceError::ModelLoad(_) => ErrorKind::ModelLoad,
                InferenceError::ShapeMismatch { .. } => ErrorKind::ShapeMismatch,
                InferenceError::Inference(_) => ErrorKind::Inference,
            },
            PipelineError::Rank(e) => match e {
                RankError::LabelMismatch { .. } => ErrorKind::LabelMismatch,
                RankError::InvalidTopK { .. } | RankError::InvalidLabels(_) => ErrorKind::Config,
                RankError::InvalidProbability { .. } => ErrorKind::Inference,
            },
            PipelineError::Config(_) => ErrorKind::Config,
        }
    }
}
