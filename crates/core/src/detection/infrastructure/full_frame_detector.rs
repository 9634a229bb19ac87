use crate::detection::domain::face_detector::FaceDetector;
use crate::shared::frame::Frame;
use crate::shared::region::FaceBox;

/// Treats the whole frame as a single face.
///
/// For reference portraits that are already cropped to the face, where a
/// learned detector would only add failure modes.
#[derive(Clone, Copy, Debug, Default)]
pub struct FullFrameFaceDetector;

impl FaceDetector for FullFrameFaceDetector {
    fn detect(&mut self, frame: &Frame) -> Result<Vec<FaceBox>, Box<dyn std::error::Error>> {
        if frame.is_empty() {
            return Ok(Vec::new());
        }
        Ok(vec![FaceBox::new(
            0,
            frame.width() as i32,
            frame.height() as i32,
            0,
        )])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_whole_frame_is_one_face() {
        let frame = Frame::new(vec![0; 30 * 20 * 3], 30, 20, 3, 0);
        let boxes = FullFrameFaceDetector.detect(&frame).unwrap();
        assert_eq!(boxes, vec![FaceBox::new(0, 30, 20, 0)]);
    }

    #[test]
    fn test_empty_frame_has_no_faces() {
        assert!(FullFrameFaceDetector.detect(&Frame::empty()).unwrap().is_empty());
    }
}
