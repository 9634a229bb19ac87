use crate::motion::domain::mask::Mask;
use crate::shared::frame::Frame;
use crate::shared::region::MotionRegion;

/// Outcome of scoring one frame for motion.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct MotionResult {
    pub motion_detected: bool,
    pub regions: Vec<MotionRegion>,
    /// Raw mask, for visualisation only. `None` when the frame was empty or
    /// only seeded the detector's history.
    pub mask: Option<Mask>,
}

impl MotionResult {
    pub fn none() -> Self {
        Self::default()
    }

    pub fn from_regions(regions: Vec<MotionRegion>, mask: Mask) -> Self {
        Self {
            motion_detected: !regions.is_empty(),
            regions,
            mask: Some(mask),
        }
    }
}

/// Domain interface for motion detection.
///
/// Implementations own their history (background model or previous frame)
/// across calls, hence `&mut self`. One instance serves one session; empty
/// frames yield [`MotionResult::none`] and never touch the history.
pub trait MotionDetector: Send {
    fn detect(&mut self, frame: &Frame) -> MotionResult;
}

/// Adaptive per-pixel scene model used by background subtraction.
pub trait BackgroundModel: Send {
    /// Scores `frame` against the model and then learns from it.
    ///
    /// Returns `None` when the frame only seeded the model (first frame, or
    /// the frame size changed).
    fn apply(&mut self, frame: &Frame) -> Option<Mask>;
}
