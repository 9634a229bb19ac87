use std::fmt::Write;

use serde::{Deserialize, Serialize};

const SECTION_TITLE: &str = "VIDEO ANALYSIS FINDINGS";
const RULE_WIDTH: usize = 80;
const NO_RESULTS: &str = "No video analysis results available.";
const NO_EVENTS: &str = "No significant events recorded.";

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SignificantEvent {
    /// Seconds since session start, e.g. `"12.5s"`.
    pub timestamp: String,
    pub description: String,
}

/// Payload handed from an analysis session to report generation.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VideoAnalysisResults {
    pub video_filename: String,
    /// Seconds.
    pub duration: f64,
    pub detected_objects_count: usize,
    pub significant_events: Vec<SignificantEvent>,
}

impl VideoAnalysisResults {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

/// Renders the findings section of a case report, ending with a blank line.
///
/// A missing or empty payload renders an explicit placeholder rather than
/// dropping the section.
pub fn render_video_analysis_section(results: Option<&VideoAnalysisResults>) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{SECTION_TITLE}");
    let _ = writeln!(out, "{}", "-".repeat(RULE_WIDTH));

    match results.filter(|r| !r.is_empty()) {
        Some(r) => {
            let _ = writeln!(out, "Video Filename: {}", r.video_filename);
            let _ = writeln!(out, "Video Duration: {:.1} seconds", r.duration);
            let _ = writeln!(out, "Detected Objects Count: {}", r.detected_objects_count);
            let _ = writeln!(out, "Significant Events:");
            if r.significant_events.is_empty() {
                let _ = writeln!(out, "{NO_EVENTS}");
            }
            for event in &r.significant_events {
                let _ = writeln!(out, "- [{}] {}", event.timestamp, event.description);
            }
        }
        None => {
            let _ = writeln!(out, "{NO_RESULTS}");
        }
    }
    out.push('\n');
    out
}
