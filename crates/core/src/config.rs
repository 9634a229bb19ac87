use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::motion::domain::motion_algorithm::MotionParams;
use crate::pipeline::feature_flags::FeatureFlags;
use crate::shared::constants::DEFAULT_MIN_MOTION_AREA;
use crate::shared::error::AnalysisError;

/// Tunables for one analysis session, persisted as JSON.
///
/// Algorithm and model names stay strings here so a bad value is reported
/// as a configuration error when the detectors are built.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    /// `mog2`, `knn` or `frame_diff`.
    pub motion_algorithm: String,
    pub history: usize,
    pub var_threshold: f32,
    pub dist2_threshold: f32,
    pub detect_shadows: bool,
    pub min_motion_area: usize,
    pub diff_threshold: u8,
    pub blur_kernel: usize,
    /// `fast` or `accurate`.
    pub face_model: String,
    pub face_confidence: f64,
    /// `histogram` or `arcface`.
    pub encoder: String,
    /// Overrides the encoder's default match distance.
    pub recognition_tolerance: Option<f64>,
    pub known_faces_dir: Option<PathBuf>,
    /// Reference images are already cropped to the face.
    pub references_cropped: bool,
    /// Local directory searched for ONNX models before the cache.
    pub model_dir: Option<PathBuf>,
    pub features: FeatureFlags,
    /// Pacing for live sessions. `None` runs as fast as frames arrive.
    pub target_fps: Option<f64>,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            motion_algorithm: "mog2".to_string(),
            history: 500,
            var_threshold: 16.0,
            dist2_threshold: 400.0,
            detect_shadows: true,
            min_motion_area: DEFAULT_MIN_MOTION_AREA,
            diff_threshold: 25,
            blur_kernel: 21,
            face_model: "fast".to_string(),
            face_confidence: 0.5,
            encoder: "histogram".to_string(),
            recognition_tolerance: None,
            known_faces_dir: None,
            references_cropped: false,
            model_dir: None,
            features: FeatureFlags::default(),
            target_fps: None,
        }
    }
}

impl AnalysisConfig {
    /// `<config dir>/IoT Triage/analysis.json`.
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|d| d.join("IoT Triage").join("analysis.json"))
    }

    pub fn load(path: &Path) -> Result<Self, AnalysisError> {
        let json = fs::read_to_string(path).map_err(|e| AnalysisError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;
        let config: Self = serde_json::from_str(&json).map_err(|e| {
            AnalysisError::Configuration(format!("invalid config {}: {e}", path.display()))
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Checks values that serde cannot. Names are checked when the
    /// detectors are built.
    pub fn validate(&self) -> Result<(), AnalysisError> {
        if let Some(fps) = self.target_fps {
            if fps <= 0.0 || !fps.is_finite() {
                return Err(AnalysisError::Configuration(format!(
                    "target_fps must be a positive number, got {fps}"
                )));
            }
        }
        Ok(())
    }

    /// Loads from [`default_path`](Self::default_path), falling back to
    /// defaults when the file is missing or invalid.
    pub fn load_default() -> Self {
        let Some(path) = Self::default_path().filter(|p| p.exists()) else {
            return Self::default();
        };
        Self::load(&path).unwrap_or_else(|e| {
            log::warn!("{e}; using default analysis settings");
            Self::default()
        })
    }

    pub fn save(&self, path: &Path) -> Result<(), AnalysisError> {
        let io_err = |e: std::io::Error| AnalysisError::Io {
            path: path.to_path_buf(),
            source: e,
        };
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(io_err)?;
        }
        let json = serde_json::to_string_pretty(self)
            .map_err(|e| AnalysisError::Configuration(e.to_string()))?;
        fs::write(path, json).map_err(io_err)
    }

    pub fn motion_params(&self) -> MotionParams {
        MotionParams {
            history: self.history,
            var_threshold: self.var_threshold,
            dist2_threshold: self.dist2_threshold,
            detect_shadows: self.detect_shadows,
            min_area: self.min_motion_area,
            diff_threshold: self.diff_threshold,
            blur_kernel: self.blur_kernel,
        }
    }
}
