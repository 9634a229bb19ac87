use std::collections::BTreeMap;
use std::time::Instant;

/// Cross-cutting logger for analysis-loop events.
///
/// Keeps stage timing and counters out of the orchestrator so each front
/// end can observe a session without changing the orchestration code.
pub trait PipelineLogger: Send {
    /// Report that `frames` frames have been analysed so far.
    fn progress(&mut self, frames: usize);

    /// Record how long a named stage took for one frame.
    fn timing(&mut self, stage: &str, duration_ms: f64);

    /// Record a point-in-time metric (e.g. region count).
    fn metric(&mut self, name: &str, value: f64);

    /// Log a human-readable status message.
    fn info(&mut self, message: &str);

    /// Emit an end-of-session summary. Default: no-op.
    fn summary(&self) {}
}

/// Silent logger that discards all events.
pub struct NullPipelineLogger;

impl PipelineLogger for NullPipelineLogger {
    fn progress(&mut self, _frames: usize) {}
    fn timing(&mut self, _stage: &str, _duration_ms: f64) {}
    fn metric(&mut self, _name: &str, _value: f64) {}
    fn info(&mut self, _message: &str) {}
}

/// Running count, sum and peak of one stream of samples.
///
/// Live sessions have no frame count known up front, so samples are folded
/// in rather than kept.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct RunningStats {
    pub count: usize,
    pub total: f64,
    pub max: f64,
}

impl RunningStats {
    fn push(&mut self, value: f64) {
        self.count += 1;
        self.total += value;
        self.max = if self.count == 1 { value } else { self.max.max(value) };
    }

    pub fn mean(&self) -> f64 {
        if self.count == 0 {
            0.0
        } else {
            self.total / self.count as f64
        }
    }
}

/// CLI-oriented logger that aggregates per-stage timing and metrics and
/// reports a summary through `log` when the session ends.
///
/// Progress output is throttled to every `throttle_frames` frames.
pub struct StdoutPipelineLogger {
    throttle_frames: usize,
    timings: BTreeMap<String, RunningStats>,
    metrics: BTreeMap<String, RunningStats>,
    start_time: Instant,
    total_frames: usize,
    messages: Vec<String>,
}

impl StdoutPipelineLogger {
    pub fn new(throttle_frames: usize) -> Self {
        Self {
            throttle_frames: throttle_frames.max(1),
            timings: BTreeMap::new(),
            metrics: BTreeMap::new(),
            start_time: Instant::now(),
            total_frames: 0,
            messages: Vec::new(),
        }
    }

    /// Formatted summary, or `None` before anything was recorded.
    pub fn summary_string(&self) -> Option<String> {
        if self.timings.is_empty() && self.metrics.is_empty() {
            return None;
        }

        let elapsed_s = self.start_time.elapsed().as_secs_f64();
        let frames = self.total_frames;
        let mut lines = vec![format!("Session summary ({frames} frames, {elapsed_s:.1}s):")];

        for (stage, stats) in &self.timings {
            lines.push(format!(
                "  {stage:12}: mean {:6.1}ms  peak {:6.1}ms  over {} frames",
                stats.mean(),
                stats.max,
                stats.count
            ));
        }
        for (name, stats) in &self.metrics {
            lines.push(format!(
                "  {name}: mean {:.1}, peak {:.0}",
                stats.mean(),
                stats.max
            ));
        }
        if frames > 0 && elapsed_s > 0.0 {
            lines.push(format!("  Rate: {:.1} fps", frames as f64 / elapsed_s));
        }

        Some(lines.join("\n"))
    }

    pub fn timings_for(&self, stage: &str) -> Option<&RunningStats> {
        self.timings.get(stage)
    }

    pub fn metrics_for(&self, name: &str) -> Option<&RunningStats> {
        self.metrics.get(name)
    }
}

impl Default for StdoutPipelineLogger {
    fn default() -> Self {
        Self::new(30)
    }
}

impl PipelineLogger for StdoutPipelineLogger {
    fn progress(&mut self, frames: usize) {
        self.total_frames = frames;
        if frames > 0 && frames % self.throttle_frames == 0 {
            log::info!("Analysed {frames} frames");
        }
    }

    fn timing(&mut self, stage: &str, duration_ms: f64) {
        self.timings
            .entry(stage.to_string())
            .or_default()
            .push(duration_ms);
    }

    fn metric(&mut self, name: &str, value: f64) {
        self.metrics.entry(name.to_string()).or_default().push(value);
    }

    fn info(&mut self, message: &str) {
        self.messages.push(message.to_string());
        log::info!("{message}");
    }

    fn summary(&self) {
        if let Some(text) = self.summary_string() {
            log::info!("\n{text}");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_null_logger_all_methods_are_noop() {
        let mut logger = NullPipelineLogger;
        logger.progress(1);
        logger.timing("motion", 5.0);
        logger.metric("faces", 3.0);
        logger.info("hello");
        logger.summary();
    }

    #[test]
    fn test_timing_aggregates_per_stage() {
        let mut logger = StdoutPipelineLogger::new(10);
        logger.timing("motion", 20.0);
        logger.timing("motion", 30.0);
        logger.timing("recognition", 5.0);

        let motion = logger.timings_for("motion").unwrap();
        assert_eq!(motion.count, 2);
        assert_relative_eq!(motion.mean(), 25.0);
        assert_relative_eq!(motion.max, 30.0);
        assert_eq!(logger.timings_for("recognition").unwrap().count, 1);
        assert!(logger.timings_for("faces").is_none());
    }

    #[test]
    fn test_peak_tracks_first_sample_even_when_negative() {
        let mut stats = RunningStats::default();
        stats.push(-2.0);
        stats.push(-5.0);
        assert_relative_eq!(stats.max, -2.0);
        assert_relative_eq!(RunningStats::default().mean(), 0.0);
    }

    #[test]
    fn test_metric_mean_in_summary() {
        let mut logger = StdoutPipelineLogger::new(10);
        logger.progress(5);
        logger.metric("motion_regions", 3.0);
        logger.metric("motion_regions", 4.0);

        let summary = logger.summary_string().unwrap();
        assert!(summary.contains("motion_regions: mean 3.5, peak 4"));
    }

    #[test]
    fn test_summary_lists_stages_in_name_order() {
        let mut logger = StdoutPipelineLogger::new(10);
        logger.progress(100);
        logger.timing("motion", 2.0);
        logger.timing("faces", 10.0);

        let summary = logger.summary_string().unwrap();
        assert!(summary.starts_with("Session summary (100 frames"));
        let faces = summary.find("faces").unwrap();
        let motion = summary.find("motion").unwrap();
        assert!(faces < motion);
        assert!(summary.contains("fps"));
    }

    #[test]
    fn test_empty_summary_returns_none() {
        assert!(StdoutPipelineLogger::new(10).summary_string().is_none());
    }

    #[test]
    fn test_info_stores_messages() {
        let mut logger = StdoutPipelineLogger::new(10);
        logger.info("stream opened");
        assert_eq!(logger.messages, vec!["stream opened".to_string()]);
    }

    #[test]
    fn test_default_throttle() {
        assert_eq!(StdoutPipelineLogger::default().throttle_frames, 30);
    }
}
