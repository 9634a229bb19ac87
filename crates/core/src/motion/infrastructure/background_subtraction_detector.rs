use crate::motion::domain::connected_regions::extract_regions;
use crate::motion::domain::motion_detector::{BackgroundModel, MotionDetector, MotionResult};
use crate::shared::frame::Frame;

/// Motion detector that scores frames against an adaptive background model
/// and reports the connected foreground regions.
pub struct BackgroundSubtractionDetector {
    model: Box<dyn BackgroundModel>,
    min_area: usize,
}

impl BackgroundSubtractionDetector {
    pub fn new(model: Box<dyn BackgroundModel>, min_area: usize) -> Self {
        Self { model, min_area }
    }
}

impl MotionDetector for BackgroundSubtractionDetector {
    fn detect(&mut self, frame: &Frame) -> MotionResult {
        if frame.is_empty() {
            return MotionResult::none();
        }
        match self.model.apply(frame) {
            Some(mask) => {
                let regions = extract_regions(&mask, self.min_area);
                MotionResult::from_regions(regions, mask)
            }
            None => MotionResult::none(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::motion::infrastructure::gaussian_background_model::GaussianBackgroundModel;
    use crate::motion::infrastructure::knn_background_model::KnnBackgroundModel;
    use crate::shared::region::MotionRegion;
    use rstest::rstest;

    fn solid(width: u32, height: u32, value: u8) -> Frame {
        Frame::new(vec![value; (width * height * 3) as usize], width, height, 3, 0)
    }

    fn with_rect(base: &Frame, x: u32, y: u32, w: u32, h: u32) -> Frame {
        let mut data = base.data().to_vec();
        for row in y..y + h {
            for col in x..x + w {
                let idx = ((row * base.width() + col) * 3) as usize;
                data[idx..idx + 3].copy_from_slice(&[255, 255, 255]);
            }
        }
        Frame::new(data, base.width(), base.height(), 3, 1)
    }

    fn gaussian() -> Box<dyn BackgroundModel> {
        Box::new(GaussianBackgroundModel::new(500, 16.0, true))
    }

    fn knn() -> Box<dyn BackgroundModel> {
        Box::new(KnnBackgroundModel::new(500, 400.0, true))
    }

    #[rstest]
    #[case::gaussian(gaussian())]
    #[case::knn(knn())]
    fn test_rectangle_above_threshold_reports_motion(#[case] model: Box<dyn BackgroundModel>) {
        let mut detector = BackgroundSubtractionDetector::new(model, 500);
        let bg = solid(100, 80, 0);
        let first = detector.detect(&bg);
        assert!(!first.motion_detected);

        // 30x30 = 900 px > 500
        let result = detector.detect(&with_rect(&bg, 20, 10, 30, 30));
        assert!(result.motion_detected);
        assert_eq!(result.regions, vec![MotionRegion::new(20, 10, 30, 30)]);
        assert!(result.mask.is_some());
    }

    #[rstest]
    #[case::gaussian(gaussian())]
    #[case::knn(knn())]
    fn test_small_change_filtered_as_noise(#[case] model: Box<dyn BackgroundModel>) {
        let mut detector = BackgroundSubtractionDetector::new(model, 500);
        let bg = solid(64, 64, 0);
        detector.detect(&bg);
        // 20x20 = 400 px <= 500
        let result = detector.detect(&with_rect(&bg, 5, 5, 20, 20));
        assert!(!result.motion_detected);
        assert!(result.regions.is_empty());
    }

    #[rstest]
    #[case::gaussian(gaussian())]
    #[case::knn(knn())]
    fn test_empty_frame_is_no_motion(#[case] model: Box<dyn BackgroundModel>) {
        let mut detector = BackgroundSubtractionDetector::new(model, 500);
        assert_eq!(detector.detect(&Frame::empty()), MotionResult::none());
        // Empty frames do not seed the model.
        let bg = solid(40, 40, 0);
        assert!(!detector.detect(&bg).motion_detected);
        assert!(detector.detect(&with_rect(&bg, 0, 0, 25, 25)).motion_detected);
    }
}
