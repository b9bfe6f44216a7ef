//! onnxruntime backend

use std::path::Path;

use image_preprocess::ImageTensor;
use ort::{GraphOptimizationLevel, Session};
use tracing::{error, info};

use crate::{ForwardPass, InferenceError, ModelShape};

/// onnxruntime session for an ONNX classifier
pub struct OrtBackend {
    session: Session,
    output_name: String,
    shape: ModelShape,
}

impl OrtBackend {
    /// Commit a session from `path`; `input` is the NHWC shape fed at runtime
    pub fn load(path: &Path, input: [usize; 4]) -> Result<Self, InferenceError> {
        if !path.is_file() {
            return Err(InferenceError::ModelNotFound(path.to_path_buf()));
        }

        info!("Loading onnxruntime session from {}", path.display());
        let session = Session::builder()
            .and_then(|builder| builder.with_optimization_level(GraphOptimizationLevel::Level3))
            .and_then(|builder| builder.commit_from_file(path))
            .map_err(|e| {
                error!("Failed to load model: {}", e);
                InferenceError::ModelLoad(e.to_string())
            })?;

        let output = session
            .outputs
            .first()
            .ok_or_else(|| InferenceError::ModelLoad("model declares no outputs".into()))?;
        let output_name = output.name.clone();

        let dims = output
            .output_type
            .tensor_dimensions()
            .ok_or_else(|| InferenceError::ModelLoad("output is not a tensor".into()))?;

        let shape = ModelShape::new(input, output_dims(dims)?)?;
        Ok(Self {
            session,
            output_name,
            shape,
        })
    }
}

/// Resolve declared output dims. Only the batch axis may be dynamic; it is
/// always 1 since one image is fed per run.
fn output_dims(declared: &[i64]) -> Result<Vec<usize>, InferenceError> {
    declared
        .iter()
        .enumerate()
        .map(|(axis, &d)| match (axis, d) {
            (0, d) if d < 0 => Ok(1),
            (_, d) if d < 0 => Err(InferenceError::ModelLoad(format!(
                "output axis {} is dynamic in {:?}, only the batch axis may be",
                axis, declared
            ))),
            (_, d) => Ok(d as usize),
        })
        .collect()
}

impl ForwardPass for OrtBackend {
    fn shape(&self) -> &ModelShape {
        &self.shape
    }

    fn forward(&self, input: &ImageTensor) -> Result<Vec<f32>, InferenceError> {
        let inputs = ort::inputs![input.view()].map_err(|e| InferenceError::Inference(e.to_string()))?;
        let outputs = self
            .session
            .run(inputs)
            .map_err(|e| InferenceError::Inference(e.to_string()))?;

        let probabilities = outputs[self.output_name.as_str()]
            .try_extract_tensor::<f32>()
            .map_err(|e| InferenceError::Inference(e.to_string()))?;

        Ok(probabilities.iter().copied().collect())
    }
}
