//! Plant Disease Classification Pipeline
//!
//! image path → preprocess → forward pass → ranked prediction.
//!
//! The model is loaded once (see [`ClassificationPipeline::from_config`])
//! and shared read-only by every prediction.

mod config;
mod error;
mod orchestrator;

pub use crate::config::PipelineConfig;
pub use error::{ErrorKind, PipelineError};
pub use orchestrator::{predict, ClassificationPipeline, Diagnosis};

pub use image_preprocess::{ImageTensor, TargetSize};
pub use inference_engine::{load_model, load_model_with, Backend, ForwardPass, InferenceError, LoadedModel, ModelShape};
pub use ranker::{ClassLabelTable, PredictionResult, RankedPrediction};
