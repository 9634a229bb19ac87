use serde::{Deserialize, Serialize};

/// Axis-aligned motion rectangle in source-frame coordinates.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MotionRegion {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
}

impl MotionRegion {
    pub fn new(x: i32, y: i32, width: i32, height: i32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn area(&self) -> i64 {
        self.width.max(0) as i64 * self.height.max(0) as i64
    }
}

/// Face bounding box as `(top, right, bottom, left)` in source-frame
/// coordinates. `right` and `bottom` are exclusive.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FaceBox {
    pub top: i32,
    pub right: i32,
    pub bottom: i32,
    pub left: i32,
}

impl FaceBox {
    pub fn new(top: i32, right: i32, bottom: i32, left: i32) -> Self {
        Self {
            top,
            right,
            bottom,
            left,
        }
    }

    /// Builds a box from float corners, clamped to a `width` x `height` frame.
    pub fn from_corners(x1: f64, y1: f64, x2: f64, y2: f64, width: u32, height: u32) -> Self {
        let clamp_x = |v: f64| v.round().clamp(0.0, width as f64) as i32;
        let clamp_y = |v: f64| v.round().clamp(0.0, height as f64) as i32;
        Self {
            top: clamp_y(y1),
            right: clamp_x(x2),
            bottom: clamp_y(y2),
            left: clamp_x(x1),
        }
    }

    pub fn width(&self) -> i32 {
        self.right - self.left
    }

    pub fn height(&self) -> i32 {
        self.bottom - self.top
    }

    pub fn is_degenerate(&self) -> bool {
        self.width() <= 0 || self.height() <= 0
    }

    pub fn to_rect(&self) -> MotionRegion {
        MotionRegion::new(self.left, self.top, self.width(), self.height())
    }
}

impl From<MotionRegion> for FaceBox {
    fn from(r: MotionRegion) -> Self {
        FaceBox::new(r.y, r.x + r.width, r.y + r.height, r.x)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[test]
    fn test_face_box_dimensions() {
        let b = FaceBox::new(10, 60, 40, 20);
        assert_eq!(b.width(), 40);
        assert_eq!(b.height(), 30);
        assert!(!b.is_degenerate());
    }

    #[test]
    fn test_rect_conversion_preserves_geometry() {
        let b = FaceBox::new(10, 60, 40, 20);
        let r = b.to_rect();
        assert_eq!(r, MotionRegion::new(20, 10, 40, 30));
        assert_eq!(FaceBox::from(r), b);
    }

    #[test]
    fn test_from_corners_clamps_to_frame() {
        let b = FaceBox::from_corners(-10.0, -5.0, 700.0, 500.0, 640, 480);
        assert_eq!(b, FaceBox::new(0, 640, 480, 0));
    }

    #[rstest]
    #[case::zero_width(FaceBox::new(0, 10, 10, 10))]
    #[case::inverted(FaceBox::new(10, 10, 0, 0))]
    fn test_degenerate_boxes(#[case] b: FaceBox) {
        assert!(b.is_degenerate());
    }

    #[test]
    fn test_motion_region_area() {
        assert_eq!(MotionRegion::new(0, 0, 30, 20).area(), 600);
        assert_eq!(MotionRegion::new(0, 0, -3, 20).area(), 0);
    }
}
