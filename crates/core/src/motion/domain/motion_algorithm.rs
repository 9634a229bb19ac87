use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::shared::constants::DEFAULT_MIN_MOTION_AREA;
use crate::shared::error::AnalysisError;

/// Which motion algorithm a detector runs. Fixed at construction.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MotionAlgorithm {
    /// Background subtraction with a running Gaussian per pixel.
    Mog2,
    /// Background subtraction with per-pixel nearest-neighbour samples.
    Knn,
    /// Absolute difference against the previous smoothed frame.
    FrameDiff,
}

impl MotionAlgorithm {
    pub fn name(&self) -> &'static str {
        match self {
            MotionAlgorithm::Mog2 => "mog2",
            MotionAlgorithm::Knn => "knn",
            MotionAlgorithm::FrameDiff => "frame_diff",
        }
    }
}

impl fmt::Display for MotionAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for MotionAlgorithm {
    type Err = AnalysisError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "mog2" | "background" | "background_subtraction" => Ok(MotionAlgorithm::Mog2),
            "knn" => Ok(MotionAlgorithm::Knn),
            "frame_diff" | "frame_differencing" | "diff" => Ok(MotionAlgorithm::FrameDiff),
            other => Err(AnalysisError::Configuration(format!(
                "unknown motion algorithm '{other}' (expected mog2, knn or frame_diff)"
            ))),
        }
    }
}

/// Tunables shared by all motion algorithms. Each algorithm reads the
/// fields that apply to it.
#[derive(Clone, Debug, PartialEq)]
pub struct MotionParams {
    /// Frames of history the background model adapts over.
    pub history: usize,
    /// Squared Mahalanobis distance above which a pixel is foreground (Gaussian model).
    pub var_threshold: f32,
    /// Squared RGB distance within which a stored sample counts as a neighbour (KNN model).
    pub dist2_threshold: f32,
    pub detect_shadows: bool,
    /// Regions whose pixel count does not exceed this are discarded as noise.
    pub min_area: usize,
    /// Per-pixel difference above which a pixel is foreground (frame differencing).
    pub diff_threshold: u8,
    /// Odd Gaussian kernel size used to smooth frames before differencing.
    pub blur_kernel: usize,
}

impl Default for MotionParams {
    fn default() -> Self {
        Self {
            history: 500,
            var_threshold: 16.0,
            dist2_threshold: 400.0,
            detect_shadows: true,
            min_area: DEFAULT_MIN_MOTION_AREA,
            diff_threshold: 25,
            blur_kernel: 21,
        }
    }
}

impl MotionParams {
    pub fn validate(&self) -> Result<(), AnalysisError> {
        if self.history == 0 {
            return Err(AnalysisError::Configuration(
                "motion history must be at least 1 frame".into(),
            ));
        }
        if self.blur_kernel == 0 || self.blur_kernel % 2 == 0 {
            return Err(AnalysisError::Configuration(format!(
                "blur kernel must be a positive odd number, got {}",
                self.blur_kernel
            )));
        }
        if self.var_threshold <= 0.0 || self.dist2_threshold <= 0.0 {
            return Err(AnalysisError::Configuration(
                "motion distance thresholds must be positive".into(),
            ));
        }
        Ok(())
    }
}
