use crate::pipeline::frame_analysis::RecognitionStatus;
use crate::shared::constants::UNKNOWN_LABEL;

/// Summary when no stage found anything.
pub const NO_DETECTIONS: &str = "No detections";

const SEPARATOR: &str = " | ";

/// Joins the active sub-results into one line, e.g.
/// `"Motion | Faces(2) | Recog: alice | Unknown faces"`.
///
/// Known names appear once each, in first-seen order.
pub fn summarize(
    motion_detected: bool,
    face_count: usize,
    recognition: RecognitionStatus,
    identities: &[String],
) -> String {
    let mut parts: Vec<String> = Vec::new();
    if motion_detected {
        parts.push("Motion".to_string());
    }
    if face_count > 0 {
        parts.push(format!("Faces({face_count})"));
    }
    match recognition {
        RecognitionStatus::NotRun => {}
        RecognitionStatus::NoKnownFaces => parts.push("Recog (No Known Faces)".to_string()),
        RecognitionStatus::Recognized => {
            let mut known: Vec<&str> = Vec::new();
            for name in identities.iter().filter(|n| n.as_str() != UNKNOWN_LABEL) {
                if !known.contains(&name.as_str()) {
                    known.push(name.as_str());
                }
            }
            if !known.is_empty() {
                parts.push(format!("Recog: {}", known.join(", ")));
            }
            if identities.iter().any(|n| n == UNKNOWN_LABEL) {
                parts.push("Unknown faces".to_string());
            }
        }
    }

    if parts.is_empty() {
        NO_DETECTIONS.to_string()
    } else {
        parts.join(SEPARATOR)
    }
}
