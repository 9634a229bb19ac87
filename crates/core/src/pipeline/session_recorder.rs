use std::time::Duration;

use crate::pipeline::frame_analysis::FrameAnalysisResult;
use crate::report::video_analysis_results::{SignificantEvent, VideoAnalysisResults};

/// Folds per-frame results into a report payload.
///
/// An event is recorded each time the status summary changes to something
/// other than "No detections".
pub struct SessionRecorder {
    label: String,
    first_seen: Option<Duration>,
    last_seen: Duration,
    frames: usize,
    detected_objects: usize,
    last_status: Option<String>,
    events: Vec<SignificantEvent>,
}

impl SessionRecorder {
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            first_seen: None,
            last_seen: Duration::ZERO,
            frames: 0,
            detected_objects: 0,
            last_status: None,
            events: Vec::new(),
        }
    }

    /// `elapsed` is the time since the session started.
    pub fn record(&mut self, result: &FrameAnalysisResult, elapsed: Duration) {
        self.first_seen.get_or_insert(elapsed);
        self.last_seen = elapsed;
        self.frames += 1;
        self.detected_objects += result.detected_objects();

        if self.last_status.as_deref() == Some(result.status.as_str()) {
            return;
        }
        if !result.is_idle() {
            self.events.push(SignificantEvent {
                timestamp: format_timestamp(elapsed),
                description: result.status.clone(),
            });
        }
        self.last_status = Some(result.status.clone());
    }

    pub fn frames(&self) -> usize {
        self.frames
    }

    pub fn finish(&self) -> VideoAnalysisResults {
        let duration = self
            .first_seen
            .map(|first| self.last_seen.saturating_sub(first).as_secs_f64())
            .unwrap_or(0.0);
        VideoAnalysisResults {
            video_filename: self.label.clone(),
            duration,
            detected_objects_count: self.detected_objects,
            significant_events: self.events.clone(),
        }
    }
}

fn format_timestamp(elapsed: Duration) -> String {
    format!("{:.1}s", elapsed.as_secs_f64())
}
