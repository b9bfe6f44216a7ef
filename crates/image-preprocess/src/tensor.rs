//! Model input tensor types

use ndarray::{Array4, ArrayView4};

use crate::PreprocessError;

/// Model input resolution (width, height) in pixels
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TargetSize {
    width: u32,
    height: u32,
}

impl TargetSize {
    /// Create a target size, rejecting zero dimensions
    pub fn new(width: u32, height: u32) -> Result<Self, PreprocessError> {
        if width == 0 || height == 0 {
            return Err(PreprocessError::InvalidTargetSize { width, height });
        }
        Ok(Self { width, height })
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Tensor shape an image of this size produces: (1, H, W, 3)
    pub fn tensor_shape(&self) -> [usize; 4] {
        [1, self.height as usize, self.width as usize, ImageTensor::CHANNELS]
    }
}

impl Default for TargetSize {
    fn default() -> Self {
        Self {
            width: 224,
            height: 224,
        }
    }
}

/// Normalized image tensor, shape (1, H, W, 3), row-major NHWC, values in [0, 1]
#[derive(Debug, Clone, PartialEq)]
pub struct ImageTensor {
    data: Array4<f32>,
}

impl ImageTensor {
    /// RGB channel count
    pub const CHANNELS: usize = 3;

    /// Build a tensor from interleaved RGB8 pixels, scaling each by 1/255
    pub fn from_rgb8(pixels: &[u8], width: u32, height: u32) -> Result<Self, PreprocessError> {
        let (width, height) = (width as usize, height as usize);
        if width == 0 || height == 0 {
            return Err(PreprocessError::ImageDecode(format!(
                "image has no pixels ({}x{})",
                width, height
            )));
        }

        let values = pixels.iter().map(|&v| f32::from(v) / 255.0).collect();
        let data = Array4::from_shape_vec((1, height, width, Self::CHANNELS), values).map_err(|_| {
            PreprocessError::ImageDecode(format!(
                "pixel buffer holds {} bytes, expected {}",
                pixels.len(),
                width * height * Self::CHANNELS
            ))
        })?;
        Ok(Self { data })
    }

    /// Build a tensor from already-normalized NHWC values
    pub fn from_raw(values: Vec<f32>, width: usize, height: usize) -> Result<Self, PreprocessError> {
        if width == 0 || height == 0 {
            return Err(PreprocessError::InvalidTensor(format!(
                "tensor has no pixels ({}x{})",
                width, height
            )));
        }
        if let Some(v) = values.iter().find(|v| !(0.0..=1.0).contains(*v)) {
            return Err(PreprocessError::InvalidTensor(format!(
                "value {} outside [0, 1]",
                v
            )));
        }

        let len = values.len();
        let data = Array4::from_shape_vec((1, height, width, Self::CHANNELS), values).map_err(|_| {
            PreprocessError::InvalidTensor(format!(
                "{} values for a {}x{} RGB tensor, expected {}",
                len,
                width,
                height,
                width * height * Self::CHANNELS
            ))
        })?;
        Ok(Self { data })
    }

    /// Shape as (batch, height, width, channels)
    pub fn shape(&self) -> [usize; 4] {
        let (batch, height, width, channels) = self.data.dim();
        [batch, height, width, channels]
    }

    /// Flat row-major values
    pub fn as_slice(&self) -> &[f32] {
        // Always built by from_shape_vec, so the layout is standard
        self.data.as_slice().unwrap_or_default()
    }

    /// Value at (y, x, channel) of the single batch element
    pub fn get(&self, y: usize, x: usize, channel: usize) -> Option<f32> {
        self.data.get([0, y, x, channel]).copied()
    }

    pub fn as_array(&self) -> &Array4<f32> {
        &self.data
    }

    pub fn view(&self) -> ArrayView4<'_, f32> {
        self.data.view()
    }

    pub fn into_array(self) -> Array4<f32> {
        self.data
    }
}
