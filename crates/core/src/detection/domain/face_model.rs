use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::shared::error::AnalysisError;

/// Which face detection model a session uses. Fixed at construction.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FaceModel {
    /// Approximate, interactive frame rates.
    #[default]
    Fast,
    /// Higher recall, suited to offline review.
    Accurate,
}

impl FaceModel {
    pub fn name(&self) -> &'static str {
        match self {
            FaceModel::Fast => "fast",
            FaceModel::Accurate => "accurate",
        }
    }
}

impl fmt::Display for FaceModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for FaceModel {
    type Err = AnalysisError;

    /// Accepts `fast`/`accurate` and the conventional `hog`/`cnn` aliases.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "fast" | "hog" | "blazeface" => Ok(FaceModel::Fast),
            "accurate" | "cnn" | "yolo" => Ok(FaceModel::Accurate),
            other => Err(AnalysisError::Configuration(format!(
                "unknown face model '{other}' (expected fast or accurate)"
            ))),
        }
    }
}
