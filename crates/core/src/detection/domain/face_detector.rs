use crate::shared::frame::Frame;
use crate::shared::region::FaceBox;

/// Domain interface for face detection.
///
/// Detectors are built once per session and reused for every frame. An
/// empty frame yields an empty list, not an error. Boxes are in the source
/// frame's coordinate space and clamped to its bounds.
pub trait FaceDetector: Send {
    fn detect(&mut self, frame: &Frame) -> Result<Vec<FaceBox>, Box<dyn std::error::Error>>;
}
