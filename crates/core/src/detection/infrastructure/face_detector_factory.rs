use std::path::{Path, PathBuf};

use crate::detection::domain::face_detector::FaceDetector;
use crate::detection::domain::face_model::FaceModel;
use crate::shared::constants::{BLAZEFACE_MODEL, YOLO_FACE_MODEL};
use crate::shared::error::AnalysisError;
use crate::shared::model_resolver::{self, ModelResolveError};

use super::onnx_blazeface_detector::OnnxBlazefaceDetector;
use super::onnx_yolo_detector::OnnxYoloDetector;

/// Builds the detector for `model`, resolving (and if needed downloading)
/// its weights. All failures surface here, before the first frame.
pub fn create_face_detector(
    model: FaceModel,
    confidence: f64,
    model_dir: Option<&Path>,
) -> Result<Box<dyn FaceDetector>, AnalysisError> {
    if !(0.0..=1.0).contains(&confidence) {
        return Err(AnalysisError::Configuration(format!(
            "face confidence must be within [0, 1], got {confidence}"
        )));
    }
    let (model, path) = resolve_face_model(model, model_dir)?;
    log::info!("Using {model} face detection (confidence={confidence})");
    match model {
        FaceModel::Fast => Ok(Box::new(OnnxBlazefaceDetector::new(&path, confidence)?)),
        FaceModel::Accurate => Ok(Box::new(OnnxYoloDetector::new(&path, confidence)?)),
    }
}

/// Finds the weights for `model` and reports which model they belong to.
///
/// BlazeFace weights have no download source. When they are not installed
/// the downloadable YOLO model is used instead.
pub fn resolve_face_model(
    model: FaceModel,
    model_dir: Option<&Path>,
) -> Result<(FaceModel, PathBuf), AnalysisError> {
    if model == FaceModel::Fast {
        match model_resolver::resolve(&BLAZEFACE_MODEL, model_dir) {
            Ok(path) => return Ok((FaceModel::Fast, path)),
            Err(ModelResolveError::NotFound(name)) => {
                log::warn!("{name} is not installed; falling back to accurate face detection");
            }
            Err(e) => return Err(e.into()),
        }
    }
    let path = model_resolver::resolve(&YOLO_FACE_MODEL, model_dir)?;
    Ok((FaceModel::Accurate, path))
}

/// Parses `name` and builds the matching detector. Unknown names are a
/// [`AnalysisError::Configuration`] error.
pub fn create_face_detector_by_name(
    name: &str,
    confidence: f64,
    model_dir: Option<&Path>,
) -> Result<Box<dyn FaceDetector>, AnalysisError> {
    create_face_detector(name.parse()?, confidence, model_dir)
}
