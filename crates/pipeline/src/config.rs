//! Pipeline configuration

use std::path::{Path, PathBuf};

use ::config::{Config, Environment, File};
use image_preprocess::TargetSize;
use inference_engine::Backend;
use ranker::ClassLabelTable;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::PipelineError;

/// Environment variable prefix, e.g. `PLANT_MODEL_PATH`
pub const ENV_PREFIX: &str = "PLANT";

/// Everything the pipeline needs, passed in explicitly at construction
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// ONNX classifier artifact
    pub model_path: PathBuf,

    /// Runtime that executes the model (`tract` or `onnxruntime`)
    pub backend: Backend,

    /// Model input width in pixels
    pub input_width: u32,

    /// Model input height in pixels
    pub input_height: u32,

    /// Class labels, in model output order
    pub labels: ClassLabelTable,

    /// Length of the ranked list
    pub top_k: usize,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            model_path: PathBuf::from("models/my_model.onnx"),
            backend: Backend::Tract,
            input_width: 224,
            input_height: 224,
            labels: ClassLabelTable::default(),
            top_k: 3,
        }
    }
}

impl PipelineConfig {
    /// Layer defaults, an optional config file (format from its extension)
    /// and `PLANT_*` environment variables, in that order. Labels can only
    /// be set from the file.
    pub fn load(path: Option<&Path>) -> Result<Self, PipelineError> {
        let mut builder = Config::builder();
        if let Some(path) = path {
            debug!("Reading pipeline config from {}", path.display());
            builder = builder.add_source(File::from(path).required(true));
        }

        let config: Self = builder
            .add_source(Environment::with_prefix(ENV_PREFIX).try_parsing(true))
            .build()?
            .try_deserialize()?;

        config.validate()?;
        Ok(config)
    }

    /// Check sizes and the top-k bound against the label table
    pub fn validate(&self) -> Result<(), PipelineError> {
        self.target_size()?;
        if self.top_k == 0 || self.top_k > self.labels.len() {
            return Err(PipelineError::Config(format!(
                "top_k must be between 1 and {} (number of labels), got {}",
                self.labels.len(),
                self.top_k
            )));
        }
        Ok(())
    }

    pub fn target_size(&self) -> Result<TargetSize, PipelineError> {
        Ok(TargetSize::new(self.input_width, self.input_height)?)
    }
}
