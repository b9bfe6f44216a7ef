//! Pipeline Orchestrator

use std::path::Path;
use std::sync::Arc;
use std::time::Instant;

use image_preprocess::{preprocess, TargetSize};
use inference_engine::{infer, load_model_with, InferenceError, LoadedModel};
use ranker::{rank, ClassLabelTable, PredictionResult, RankError};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::{PipelineConfig, PipelineError};

/// Prediction for an image submitted with a plant-type label
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Diagnosis {
    /// Caller-supplied plant type, passed through untouched
    pub plant_type: String,
    #[serde(flatten)]
    pub prediction: PredictionResult,
    /// Wall-clock time of preprocess + inference + ranking
    pub processing_time_ms: u64,
}

/// Classify one image with an already loaded model.
///
/// The input size comes from the model's declared input shape. Fails with
/// the first stage error, unchanged.
pub fn predict(
    model: &LoadedModel,
    image_path: &Path,
    labels: &ClassLabelTable,
    top_k: usize,
) -> Result<PredictionResult, PipelineError> {
    let [_, height, width, _] = model.input_shape();
    let to_u32 = |v: usize| {
        u32::try_from(v).map_err(|_| PipelineError::Config(format!("model input dimension {} too large", v)))
    };
    let target = TargetSize::new(to_u32(width)?, to_u32(height)?)?;

    run(model, image_path, target, labels, top_k)
}

fn run(
    model: &LoadedModel,
    image_path: &Path,
    target: TargetSize,
    labels: &ClassLabelTable,
    top_k: usize,
) -> Result<PredictionResult, PipelineError> {
    let tensor = preprocess(image_path, target)?;
    let probabilities = infer(model, &tensor)?;
    drop(tensor);

    let result = rank(&probabilities, labels, top_k)?;
    debug!(
        "{} → {} ({:.4})",
        image_path.display(),
        result.predicted_label(),
        result.confidence()
    );
    Ok(result)
}

/// Configured pipeline around a shared, read-only model.
///
/// Label count and input size are checked against the model once, here,
/// instead of on every call.
#[derive(Debug, Clone)]
pub struct ClassificationPipeline {
    model: Arc<LoadedModel>,
    labels: ClassLabelTable,
    target: TargetSize,
    top_k: usize,
}

impl ClassificationPipeline {
    /// Load the model named in `config` and build the pipeline around it
    pub fn from_config(config: &PipelineConfig) -> Result<Self, PipelineError> {
        config.validate()?;
        let model = load_model_with(&config.model_path, config.target_size()?, config.backend)?;
        Self::new(config, Arc::new(model))
    }

    /// Build a pipeline around an already loaded model
    pub fn new(config: &PipelineConfig, model: Arc<LoadedModel>) -> Result<Self, PipelineError> {
        config.validate()?;
        let target = config.target_size()?;

        if model.input_shape() != target.tensor_shape() {
            return Err(InferenceError::ShapeMismatch {
                expected: model.input_shape().to_vec(),
                actual: target.tensor_shape().to_vec(),
            }
            .into());
        }
        if model.num_classes() != config.labels.len() {
            return Err(RankError::LabelMismatch {
                labels: config.labels.len(),
                probabilities: model.num_classes(),
            }
            .into());
        }

        info!(
            "Pipeline ready: model={}, backend={}, input={}x{}, classes={}, top_k={}",
            model.source(),
            config.backend.as_str(),
            target.width(),
            target.height(),
            config.labels.len(),
            config.top_k
        );

        Ok(Self {
            model,
            labels: config.labels.clone(),
            target,
            top_k: config.top_k,
        })
    }

    /// Classify the image at `image_path`
    pub fn predict(&self, image_path: &Path) -> Result<PredictionResult, PipelineError> {
        run(&self.model, image_path, self.target, &self.labels, self.top_k)
    }

    /// Classify an image submitted together with its plant type
    pub fn diagnose(&self, image_path: &Path, plant_type: &str) -> Result<Diagnosis, PipelineError> {
        let start = Instant::now();
        let prediction = self.predict(image_path)?;

        Ok(Diagnosis {
            plant_type: plant_type.to_string(),
            prediction,
            processing_time_ms: start.elapsed().as_millis() as u64,
        })
    }

    pub fn model(&self) -> &Arc<LoadedModel> {
        &self.model
    }

    pub fn labels(&self) -> &ClassLabelTable {
        &self.labels
    }

    pub fn target_size(&self) -> TargetSize {
        self.target
    }

    pub fn top_k(&self) -> usize {
        self.top_k
    }
}
