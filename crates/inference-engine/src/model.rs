//! Loaded model handle and the backend seam

use std::path::Path;

use image_preprocess::{ImageTensor, TargetSize};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::tract_backend::TractBackend;
use crate::InferenceError;

/// Runtime used to execute the model
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Backend {
    #[default]
    Tract,
    /// Requires the `onnxruntime` feature
    OnnxRuntime,
}

impl Backend {
    pub fn as_str(&self) -> &'static str {
        match self {
            Backend::Tract => "tract",
            Backend::OnnxRuntime => "onnxruntime",
        }
    }
}

impl std::str::FromStr for Backend {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "tract" => Ok(Backend::Tract),
            "onnxruntime" | "ort" => Ok(Backend::OnnxRuntime),
            other => Err(format!("unknown backend '{}', expected tract or onnxruntime", other)),
        }
    }
}

/// Declared tensor shapes of a loaded model
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelShape {
    input: [usize; 4],
    output: Vec<usize>,
}

impl ModelShape {
    /// Validate an NHWC RGB input with batch 1 and an output whose last
    /// axis is the class dimension
    pub fn new(input: [usize; 4], output: Vec<usize>) -> Result<Self, InferenceError> {
        if input[0] != 1 || input[3] != ImageTensor::CHANNELS || input[1] == 0 || input[2] == 0 {
            return Err(InferenceError::ModelLoad(format!(
                "unsupported input shape {:?}, expected [1, H, W, 3]",
                input
            )));
        }
        match output.last() {
            Some(&classes) if classes > 0 && output.iter().product::<usize>() == classes => {}
            _ => {
                return Err(InferenceError::ModelLoad(format!(
                    "unsupported output shape {:?}, expected a single probability vector",
                    output
                )))
            }
        }
        Ok(Self { input, output })
    }

    /// (batch, height, width, channels)
    pub fn input(&self) -> [usize; 4] {
        self.input
    }

    pub fn output(&self) -> &[usize] {
        &self.output
    }

    /// Size of the class axis
    pub fn num_classes(&self) -> usize {
        self.output.last().copied().unwrap_or(0)
    }
}

/// A runtime able to run one forward pass of a classifier.
///
/// Implementations must tolerate concurrent `forward` calls from several
/// threads; the handle is shared read-only.
pub trait ForwardPass: Send + Sync {
    /// Shapes the backend was built for
    fn shape(&self) -> &ModelShape;

    /// Run the network on `input` and return the output of batch element 0
    fn forward(&self, input: &ImageTensor) -> Result<Vec<f32>, InferenceError>;
}

/// Deserialized network plus its declared shapes. Read-only once built.
pub struct LoadedModel {
    backend: Box<dyn ForwardPass>,
    source: String,
}

impl LoadedModel {
    /// Wrap an already constructed backend
    pub fn from_backend<B>(backend: B, source: impl Into<String>) -> Self
    where
        B: ForwardPass + 'static,
    {
        Self {
            backend: Box::new(backend),
            source: source.into(),
        }
    }

    pub fn shape(&self) -> &ModelShape {
        self.backend.shape()
    }

    pub fn input_shape(&self) -> [usize; 4] {
        self.shape().input()
    }

    pub fn output_shape(&self) -> &[usize] {
        self.shape().output()
    }

    pub fn num_classes(&self) -> usize {
        self.shape().num_classes()
    }

    /// Where the model came from (artifact path or backend label)
    pub fn source(&self) -> &str {
        &self.source
    }

    pub(crate) fn backend(&self) -> &dyn ForwardPass {
        self.backend.as_ref()
    }
}

impl std::fmt::Debug for LoadedModel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LoadedModel")
            .field("source", &self.source)
            .field("shape", self.shape())
            .finish()
    }
}

/// Load an ONNX classifier with tract, its input pinned to `input_size`.
///
/// Checks the artifact exists before deserializing so a missing file is
/// reported as such rather than as a parse failure.
pub fn load_model(path: &Path, input_size: TargetSize) -> Result<LoadedModel, InferenceError> {
    load_model_with(path, input_size, Backend::Tract)
}

/// Load an ONNX classifier on the given runtime
pub fn load_model_with(path: &Path, input_size: TargetSize, backend: Backend) -> Result<LoadedModel, InferenceError> {
    if !path.is_file() {
        return Err(InferenceError::ModelNotFound(path.to_path_buf()));
    }

    info!("Loading model from {} ({})", path.display(), backend.as_str());
    let input = input_size.tensor_shape();
    let source = path.display().to_string();
    let model = match backend {
        Backend::Tract => LoadedModel::from_backend(TractBackend::load(path, input)?, source),
        #[cfg(feature = "onnxruntime")]
        Backend::OnnxRuntime => LoadedModel::from_backend(crate::OrtBackend::load(path, input)?, source),
        #[cfg(not(feature = "onnxruntime"))]
        Backend::OnnxRuntime => {
            return Err(InferenceError::ModelLoad(
                "onnxruntime backend requested but this build lacks the `onnxruntime` feature".into(),
            ))
        }
    };

    info!("Model input shape: {:?}", model.input_shape());
    info!("Model output shape: {:?}", model.output_shape());
    Ok(model)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_model_shape_validation() {
        let shape = ModelShape::new([1, 224, 224, 3], vec![1, 6]).unwrap();
        assert_eq!(shape.num_classes(), 6);

        assert!(ModelShape::new([2, 224, 224, 3], vec![1, 6]).is_err());
        assert!(ModelShape::new([1, 3, 224, 224], vec![1, 6]).is_err());
        assert!(ModelShape::new([1, 224, 224, 3], vec![1, 0]).is_err());
        assert!(ModelShape::new([1, 224, 224, 3], vec![]).is_err());
        assert!(ModelShape::new([1, 224, 224, 3], vec![4, 6]).is_err());
    }

    #[test]
    fn test_missing_model_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("my_model.onnx");

        let result = load_model(&path, TargetSize::default());
        match result {
            Err(InferenceError::ModelNotFound(p)) => assert_eq!(p, path),
            other => panic!("expected ModelNotFound, got {:?}", other),
        }
    }

    #[test]
    fn test_directory_is_not_a_model() {
        let dir = tempfile::tempdir().unwrap();
        let result = load_model(dir.path(), TargetSize::default());
        assert!(matches!(result, Err(InferenceError::ModelNotFound(_))));
    }

    #[test]
    fn test_backend_names() {
        assert_eq!(Backend::default(), Backend::Tract);
        assert_eq!(serde_json::to_string(&Backend::OnnxRuntime).unwrap(), r#""onnxruntime""#);
        let parsed: Backend = serde_json::from_str(r#""tract""#).unwrap();
        assert_eq!(parsed, Backend::Tract);

        assert_eq!("ORT".parse::<Backend>(), Ok(Backend::OnnxRuntime));
        assert!("tflite".parse::<Backend>().is_err());
    }

    #[test]
    fn test_missing_model_not_found_on_any_backend() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("my_model.onnx");
        for backend in [Backend::Tract, Backend::OnnxRuntime] {
            let result = load_model_with(&path, TargetSize::default(), backend);
            assert!(matches!(result, Err(InferenceError::ModelNotFound(_))));
        }
    }

    #[test]
    fn test_corrupt_model_load_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("my_model.onnx");
        let mut file = std::fs::File::create(&path).unwrap();
        file.write_all(b"not an onnx model, just some text").unwrap();

        let result = load_model(&path, TargetSize::default());
        assert!(matches!(result, Err(InferenceError::ModelLoad(_))));
    }
}
