//! Plant disease detection: image preprocessing, feature extraction,
//! the threshold classifier and the detector entry point that owns the
//! fallback policy.
//!
//! This is a heuristic stand-in for a trained model. The thresholds and
//! probabilities are the behavioural contract; accuracy is not.

pub mod classifier;
pub mod detector;
pub mod features;
pub mod labels;
pub mod preprocess;
pub mod rng;
pub mod samples;

pub use classifier::*;
pub use detector::*;
pub use features::*;
pub use labels::*;
pub use rng::*;
pub use samples::*;

use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum DetectionError {
    #[error("Failed to read image {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to decode image: {0}")]
    Decode(String),

    #[error("Image has zero width or height")]
    EmptyImage,

    #[error("Unknown class label: {0}")]
    UnknownLabel(String),
}
