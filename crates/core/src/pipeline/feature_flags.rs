use serde::{Deserialize, Serialize};

/// Caller-selected stages. May change between cycles; detectors persist.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FeatureFlags {
    pub motion: bool,
    pub face_detection: bool,
    pub face_recognition: bool,
}

impl FeatureFlags {
    pub fn all() -> Self {
        Self {
            motion: true,
            face_detection: true,
            face_recognition: true,
        }
    }

    pub fn any(&self) -> bool {
        self.motion || self.face_detection || self.face_recognition
    }
}

/// Stages to run in one cycle.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct StagePlan {
    pub motion: bool,
    pub face_detection: bool,
    /// Runs only on the boxes face detection produced this cycle.
    pub recognition: bool,
}

impl StagePlan {
    /// Per-cycle decision table. Recognition needs face detection to have
    /// run; requesting it alone plans nothing for faces.
    pub fn for_flags(flags: FeatureFlags) -> Self {
        let (motion, face_detection, recognition) =
            match (flags.motion, flags.face_detection, flags.face_recognition) {
                (false, false, false) => (false, false, false),
                (false, false, true) => (false, false, false),
                (false, true, false) => (false, true, false),
                (false, true, true) => (false, true, true),
                (true, false, false) => (true, false, false),
                (true, false, true) => (true, false, false),
                (true, true, false) => (true, true, false),
                (true, true, true) => (true, true, true),
            };
        Self {
            motion,
            face_detection,
            recognition,
        }
    }
}
