//! Image → tensor preprocessing

use std::path::Path;

use image::imageops::{self, FilterType};
use image::{DynamicImage, ImageError, ImageReader};
use tracing::debug;

use crate::{ImageTensor, PreprocessError, TargetSize};

/// Load an image from disk and turn it into a (1, H, W, 3) tensor
pub fn preprocess(image_path: &Path, target: TargetSize) -> Result<ImageTensor, PreprocessError> {
    let load_error = |reason: String| PreprocessError::ImageLoad {
        path: image_path.to_path_buf(),
        reason,
    };

    let image = ImageReader::open(image_path)
        .and_then(|reader| reader.with_guessed_format())
        .map_err(|e| load_error(e.to_string()))?
        .decode()
        .map_err(|e| match e {
            ImageError::Limits(limit) => PreprocessError::ImageDecode(limit.to_string()),
            other => load_error(other.to_string()),
        })?;

    debug!(
        "Decoded {} ({}x{}, {:?})",
        image_path.display(),
        image.width(),
        image.height(),
        image.color()
    );

    preprocess_image(image, target)
}

/// Turn an already decoded image into a (1, H, W, 3) tensor.
///
/// Non-RGB inputs are coerced (alpha dropped, grey replicated), then the
/// image is stretched to `target` with bilinear filtering.
pub fn preprocess_image(image: DynamicImage, target: TargetSize) -> Result<ImageTensor, PreprocessError> {
    if image.width() == 0 || image.height() == 0 {
        return Err(PreprocessError::ImageDecode(format!(
            "image has no pixels ({}x{})",
            image.width(),
            image.height()
        )));
    }

    let rgb = image.into_rgb8();
    let resized = imageops::resize(&rgb, target.width(), target.height(), FilterType::Triangle);

    ImageTensor::from_rgb8(resized.as_raw(), resized.width(), resized.height())
}
