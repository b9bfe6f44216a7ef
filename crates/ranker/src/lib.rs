//! Prediction Ranking
//!
//! Maps a classifier's probability vector onto the ordered class-label
//! table and builds the top-1 / top-k result.

mod labels;
mod rank;

pub use labels::ClassLabelTable;
pub use rank::{rank, PredictionResult, RankedPrediction};

use thiserror::Error;

/// Errors during ranking
#[derive(Debug, Clone, PartialEq, Error)]
pub enum RankError {
    /// Label table and model output disagree in length
    #[error("Label table has {labels} entries but the model produced {probabilities} probabilities")]
    LabelMismatch { labels: usize, probabilities: usize },

    /// k outside 1..=classes
    #[error("Top-k of {k} is invalid for {classes} classes")]
    InvalidTopK { k: usize, classes: usize },

    /// NaN, infinite or negative entry in the probability vector
    #[error("Invalid probability {value} for class {index}")]
    InvalidProbability { index: usize, value: f32 },

    /// Unusable label table
    #[error("Invalid label table: {0}")]
    InvalidLabels(String),
}
