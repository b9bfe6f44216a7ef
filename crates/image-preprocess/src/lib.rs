//! Image Preprocessing
//!
//! Turns a raster image on disk into the model input tensor:
//! decode, coerce to RGB, stretch to the target size, scale to [0, 1]
//! and add the batch axis.

mod preprocess;
mod tensor;

pub use preprocess::{preprocess, preprocess_image};
pub use tensor::{ImageTensor, TargetSize};

use std::path::PathBuf;
use thiserror::Error;

/// Errors during image preprocessing
#[derive(Debug, Error)]
pub enum PreprocessError {
    /// File missing, unreadable, corrupt or in an unsupported format
    #[error("Failed to load image {path}: {reason}")]
    ImageLoad { path: PathBuf, reason: String },

    /// Pixel data could not be extracted from a decoded image
    #[error("Failed to decode pixel data: {0}")]
    ImageDecode(String),

    /// Target size with a zero dimension
    #[error("Invalid target size {width}x{height}")]
    InvalidTargetSize { width: u32, height: u32 },

    /// Raw tensor data that does not describe an NHWC RGB tensor in [0, 1]
    #[error("Invalid tensor: {0}")]
    InvalidTensor(String),
}
