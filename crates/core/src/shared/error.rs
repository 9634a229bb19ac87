use std::path::PathBuf;

use thiserror::Error;

use crate::shared::model_resolver::ModelResolveError;

/// Failure taxonomy for the analysis core.
///
/// Grab failures never escape `FrameSource::read`; they close the source and
/// surface as end-of-stream. Recognition without known faces is a status,
/// not an error.
#[derive(Error, Debug)]
pub enum AnalysisError {
    #[error("capture source '{source_id}' unavailable: {reason}")]
    CaptureUnavailable { source_id: String, reason: String },

    #[error("frame grab failed: {0}")]
    FrameGrab(String),

    #[error("invalid configuration: {0}")]
    Configuration(String),

    #[error(transparent)]
    Model(#[from] ModelResolveError),

    #[error("inference failed: {0}")]
    Inference(String),

    #[error("invalid state: {0}")]
    InvalidState(String),

    #[error("failed to decode image {path}: {source}")]
    ImageDecode {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    #[error("i/o error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl AnalysisError {
    pub fn inference(e: impl std::fmt::Display) -> Self {
        AnalysisError::Inference(e.to_string())
    }
}
