//! ONNX Inference Engine
//!
//! Loads a classifier artifact once and runs single-image forward passes
//! against it. tract is the default runtime; onnxruntime is available
//! behind the `onnxruntime` feature.

mod model;
#[cfg(feature = "onnxruntime")]
mod ort_backend;
mod runner;
mod tract_backend;

pub use model::{load_model, load_model_with, Backend, ForwardPass, LoadedModel, ModelShape};
#[cfg(feature = "onnxruntime")]
pub use ort_backend::OrtBackend;
pub use runner::infer;
pub use tract_backend::TractBackend;

use std::path::PathBuf;
use thiserror::Error;

/// Errors during model loading and inference
#[derive(Debug, Error)]
pub enum InferenceError {
    #[error("Model not found at {0}")]
    ModelNotFound(PathBuf),
    #[error("Model load failed: {0}")]
    ModelLoad(String),
    #[error("Invalid input shape: expected {expected:?}, got {actual:?}")]
    ShapeMismatch {
        expected: Vec<usize>,
        actual: Vec<usize>,
    },
    #[error("Inference failed: {0}")]
    Inference(String),
}
