//! tract runtime backend

use std::path::Path;

use image_preprocess::ImageTensor;
use tract_onnx::prelude::*;

use crate::{ForwardPass, InferenceError, ModelShape};

type TractPlan = SimplePlan<TypedFact, Box<dyn TypedOp>, Graph<TypedFact, Box<dyn TypedOp>>>;

/// Optimized, runnable tract plan for an ONNX classifier
pub struct TractBackend {
    plan: TractPlan,
    shape: ModelShape,
}

impl TractBackend {
    /// Deserialize, pin the input to `input` (NHWC f32) and optimize
    pub fn load(path: &Path, input: [usize; 4]) -> Result<Self, InferenceError> {
        let load_err = |e: TractError| InferenceError::ModelLoad(e.to_string());

        let plan = tract_onnx::onnx()
            .model_for_path(path)
            .and_then(|model| model.with_input_fact(0, f32::fact(input).into()))
            .and_then(|model| model.into_optimized())
            .and_then(|model| model.into_runnable())
            .map_err(load_err)?;

        let output = plan
            .model()
            .output_fact(0)
            .map_err(load_err)?
            .shape
            .as_concrete()
            .map(|dims| dims.to_vec())
            .ok_or_else(|| InferenceError::ModelLoad("output shape is not concrete".into()))?;

        let shape = ModelShape::new(input, output)?;
        Ok(Self { plan, shape })
    }
}

impl ForwardPass for TractBackend {
    fn shape(&self) -> &ModelShape {
        &self.shape
    }

    fn forward(&self, input: &ImageTensor) -> Result<Vec<f32>, InferenceError> {
        let run_err = |e: TractError| InferenceError::Inference(e.to_string());

        // tract links its own ndarray, so hand over the contiguous buffer
        let tensor = Tensor::from_shape::<f32>(&input.shape(), input.as_slice()).map_err(run_err)?;
        let outputs = self.plan.run(tvec!(tensor.into())).map_err(run_err)?;
        let first = outputs
            .first()
            .ok_or_else(|| InferenceError::Inference("model produced no outputs".into()))?;

        Ok(first.as_slice::<f32>().map_err(run_err)?.to_vec())
    }
}
