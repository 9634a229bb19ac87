use crate::motion::domain::connected_regions::extract_regions;
use crate::motion::domain::mask::Mask;
use crate::motion::domain::motion_detector::{MotionDetector, MotionResult};
use crate::shared::frame::Frame;

use super::image_ops::{dilate_3x3, gaussian_blur, gaussian_kernel_1d, threshold_abs_diff, to_gray};

const DILATE_ITERATIONS: usize = 2;

struct SmoothedFrame {
    gray: Vec<u8>,
    width: u32,
    height: u32,
}

/// Detects motion as the thresholded difference between consecutive
/// smoothed grayscale frames.
///
/// The first frame (and the first after a size change) has no predecessor
/// and only seeds the previous-frame buffer.
pub struct FrameDifferenceDetector {
    threshold: u8,
    min_area: usize,
    kernel: Vec<f32>,
    temp: Vec<f32>,
    previous: Option<SmoothedFrame>,
}

impl FrameDifferenceDetector {
    pub fn new(threshold: u8, blur_kernel: usize, min_area: usize) -> Self {
        Self {
            threshold,
            min_area,
            kernel: gaussian_kernel_1d(blur_kernel.max(1) | 1),
            temp: Vec::new(),
            previous: None,
        }
    }

    fn smooth(&mut self, frame: &Frame) -> SmoothedFrame {
        let (w, h) = (frame.width() as usize, frame.height() as usize);
        let mut gray = to_gray(frame.data(), w, h, frame.channels() as usize);
        gaussian_blur(&mut gray, w, h, &self.kernel, &mut self.temp);
        SmoothedFrame {
            gray,
            width: frame.width(),
            height: frame.height(),
        }
    }
}

impl MotionDetector for FrameDifferenceDetector {
    fn detect(&mut self, frame: &Frame) -> MotionResult {
        if frame.is_empty() {
            return MotionResult::none();
        }
        let current = self.smooth(frame);
        let result = match &self.previous {
            Some(prev) if prev.width == current.width && prev.height == current.height => {
                self.score(prev, &current)
            }
            _ => MotionResult::none(),
        };
        self.previous = Some(current);
        result
    }
}

impl FrameDifferenceDetector {
    fn score(&self, prev: &SmoothedFrame, curr: &SmoothedFrame) -> MotionResult {
        let (w, h) = (curr.width as usize, curr.height as usize);
        let mut diff = threshold_abs_diff(&prev.gray, &curr.gray, self.threshold);
        dilate_3x3(&mut diff, w, h, DILATE_ITERATIONS);
        let mask = Mask::new(diff, curr.width, curr.height);
        let regions = extract_regions(&mask, self.min_area);
        MotionResult::from_regions(regions, mask)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

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

    #[test]
    fn test_first_call_reports_no_motion_regardless_of_content() {
        let mut detector = FrameDifferenceDetector::new(25, 21, 500);
        let busy = with_rect(&solid(80, 80, 0), 10, 10, 50, 50);
        let result = detector.detect(&busy);
        assert!(!result.motion_detected);
        assert!(result.regions.is_empty());
        assert!(result.mask.is_none());
    }

    #[test]
    fn test_rectangle_between_frames_is_motion() {
        let mut detector = FrameDifferenceDetector::new(25, 21, 500);
        let bg = solid(120, 100, 0);
        detector.detect(&bg);
        let result = detector.detect(&with_rect(&bg, 40, 30, 40, 40));
        assert!(result.motion_detected);
        assert_eq!(result.regions.len(), 1);
        let r = result.regions[0];
        // Dilation and blur grow the region around the rectangle.
        assert!(r.x <= 40 && r.y <= 30);
        assert!(r.x + r.width >= 80 && r.y + r.height >= 70);
    }

    #[test]
    fn test_identical_frames_have_no_motion() {
        let mut detector = FrameDifferenceDetector::new(25, 21, 500);
        let frame = with_rect(&solid(60, 60, 30), 5, 5, 20, 20);
        detector.detect(&frame);
        let result = detector.detect(&frame);
        assert!(!result.motion_detected);
        assert_eq!(result.mask.unwrap().count(255), 0);
    }

    #[test]
    fn test_empty_frame_is_no_motion_and_keeps_history() {
        let mut detector = FrameDifferenceDetector::new(25, 21, 500);
        let bg = solid(100, 100, 0);
        detector.detect(&bg);
        assert_eq!(detector.detect(&Frame::empty()), MotionResult::none());
        assert!(detector.detect(&with_rect(&bg, 20, 20, 40, 40)).motion_detected);
    }

    #[test]
    fn test_truncated_buffer_is_no_motion() {
        let mut detector = FrameDifferenceDetector::new(25, 21, 500);
        let bg = solid(100, 100, 0);
        detector.detect(&bg);
        let truncated = Frame::new(vec![255; 100 * 50 * 3], 100, 100, 3, 1);
        assert_eq!(detector.detect(&truncated), MotionResult::none());
    }

    #[test]
    fn test_size_change_reseeds() {
        let mut detector = FrameDifferenceDetector::new(25, 21, 500);
        detector.detect(&solid(50, 50, 0));
        let result = detector.detect(&solid(60, 60, 255));
        assert!(!result.motion_detected);
        assert!(detector.detect(&solid(60, 60, 255)).mask.is_some());
    }
}
