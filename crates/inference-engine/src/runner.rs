//! Single forward pass over a loaded model

use std::time::Instant;

use image_preprocess::ImageTensor;
use tracing::debug;

use crate::{InferenceError, LoadedModel};

/// Run one forward pass and return the per-class probabilities.
///
/// The tensor shape must equal the model's declared input exactly.
pub fn infer(model: &LoadedModel, tensor: &ImageTensor) -> Result<Vec<f32>, InferenceError> {
    let expected = model.input_shape();
    let actual = tensor.shape();
    if actual != expected {
        return Err(InferenceError::ShapeMismatch {
            expected: expected.to_vec(),
            actual: actual.to_vec(),
        });
    }

    let start = Instant::now();
    let probabilities = model.backend().forward(tensor)?;
    let latency_ms = start.elapsed().as_millis() as u64;

    if probabilities.len() != model.num_classes() {
        return Err(InferenceError::Inference(format!(
            "model returned {} values, declared {} classes",
            probabilities.len(),
            model.num_classes()
        )));
    }
    if let Some((idx, value)) = probabilities.iter().enumerate().find(|(_, v)| !v.is_finite()) {
        return Err(InferenceError::Inference(format!(
            "non-finite output {} at class {}",
            value, idx
        )));
    }

    debug!("Inference completed in {}ms ({} classes)", latency_ms, probabilities.len());
    Ok(probabilities)
}
