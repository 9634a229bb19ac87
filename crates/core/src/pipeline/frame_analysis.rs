use serde::{Deserialize, Serialize};

use crate::pipeline::status_summary::NO_DETECTIONS;
use crate::shared::region::{FaceBox, MotionRegion};

/// What the recognition stage did this cycle.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecognitionStatus {
    #[default]
    NotRun,
    Recognized,
    /// Requested, but there is nothing to match against.
    NoKnownFaces,
}

/// Everything one cycle found, in source-frame coordinates.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct FrameAnalysisResult {
    pub frame_index: usize,
    pub motion_detected: bool,
    pub motion_regions: Vec<MotionRegion>,
    pub face_boxes: Vec<FaceBox>,
    /// One label per face box when recognition ran, otherwise empty.
    pub identities: Vec<String>,
    pub recognition: RecognitionStatus,
    pub status: String,
}

impl FrameAnalysisResult {
    /// Motion regions plus face boxes.
    pub fn detected_objects(&self) -> usize {
        self.motion_regions.len() + self.face_boxes.len()
    }

    pub fn is_idle(&self) -> bool {
        self.status == NO_DETECTIONS
    }

    /// Face boxes paired with their labels, when recognition ran.
    pub fn labelled_faces(&self) -> impl Iterator<Item = (&FaceBox, &str)> {
        self.face_boxes
            .iter()
            .zip(self.identities.iter().map(String::as_str))
    }
}
