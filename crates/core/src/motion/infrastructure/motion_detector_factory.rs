use crate::motion::domain::motion_algorithm::{MotionAlgorithm, MotionParams};
use crate::motion::domain::motion_detector::MotionDetector;
use crate::shared::error::AnalysisError;

use super::background_subtraction_detector::BackgroundSubtractionDetector;
use super::frame_difference_detector::FrameDifferenceDetector;
use super::gaussian_background_model::GaussianBackgroundModel;
use super::knn_background_model::KnnBackgroundModel;

/// Builds the motion detector for `algorithm`. Invalid parameters fail here,
/// never on a later frame.
pub fn create_motion_detector(
    algorithm: MotionAlgorithm,
    params: &MotionParams,
) -> Result<Box<dyn MotionDetector>, AnalysisError> {
    params.validate()?;
    log::info!(
        "Using {} motion detection (min_area={})",
        algorithm,
        params.min_area
    );
    let detector: Box<dyn MotionDetector> = match algorithm {
        MotionAlgorithm::Mog2 => Box::new(BackgroundSubtractionDetector::new(
            Box::new(GaussianBackgroundModel::new(
                params.history,
                params.var_threshold,
                params.detect_shadows,
            )),
            params.min_area,
        )),
        MotionAlgorithm::Knn => Box::new(BackgroundSubtractionDetector::new(
            Box::new(KnnBackgroundModel::new(
                params.history,
                params.dist2_threshold,
                params.detect_shadows,
            )),
            params.min_area,
        )),
        MotionAlgorithm::FrameDiff => Box::new(FrameDifferenceDetector::new(
            params.diff_threshold,
            params.blur_kernel,
            params.min_area,
        )),
    };
    Ok(detector)
}
