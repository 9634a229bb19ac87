use std::ops::ControlFlow;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use crate::capture::domain::source_id::SourceId;
use crate::pipeline::frame_analysis::FrameAnalysisResult;
use crate::pipeline::orchestrator::{CycleOutcome, FrameAnalysisOrchestrator};
use crate::shared::error::AnalysisError;

/// Shared stop request. Clones observe the same flag, so a signal handler or
/// another thread can end a running session.
#[derive(Clone, Debug, Default)]
pub struct CancellationToken(Arc<AtomicBool>);

impl CancellationToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StopReason {
    Cancelled,
    StreamEnded,
    FrameLimit,
    /// The per-frame callback returned `ControlFlow::Break`.
    StoppedByCaller,
}

#[derive(Clone, Debug, PartialEq)]
pub struct SessionSummary {
    pub frames: usize,
    pub stop_reason: StopReason,
    pub elapsed: Duration,
}

/// Drives an orchestrator from `start` to `stop`, one cycle at a time.
///
/// Cancellation is checked between cycles; a cycle in progress always
/// completes. The orchestrator is `Idle` when `run` returns, whatever the
/// outcome.
pub struct SessionRunner {
    cancel: CancellationToken,
    frame_interval: Option<Duration>,
    max_frames: Option<usize>,
}

impl SessionRunner {
    pub fn new(cancel: CancellationToken) -> Self {
        Self {
            cancel,
            frame_interval: None,
            max_frames: None,
        }
    }

    /// Caps the cycle rate. Rates that are not positive, or so small that
    /// the interval cannot be represented, leave it uncapped.
    pub fn with_target_fps(mut self, fps: f64) -> Self {
        self.frame_interval = if fps > 0.0 {
            Duration::try_from_secs_f64(1.0 / fps).ok()
        } else {
            None
        };
        if self.frame_interval.is_none() {
            log::warn!("Ignoring target rate {fps} fps; running uncapped");
        }
        self
    }

    pub fn with_max_frames(mut self, max_frames: usize) -> Self {
        self.max_frames = Some(max_frames);
        self
    }

    /// Runs until cancelled, the stream ends, the frame limit is reached or
    /// `on_frame` breaks. `on_frame` receives each result with the time
    /// since the session started.
    pub fn run<F>(
        &self,
        orchestrator: &mut FrameAnalysisOrchestrator,
        source: &SourceId,
        mut on_frame: F,
    ) -> Result<SessionSummary, AnalysisError>
    where
        F: FnMut(&FrameAnalysisResult, Duration) -> ControlFlow<()>,
    {
        orchestrator.start(source)?;
        let started = Instant::now();
        let mut frames = 0usize;

        let stop_reason = loop {
            if self.cancel.is_cancelled() {
                break StopReason::Cancelled;
            }
            if self.max_frames.is_some_and(|max| frames >= max) {
                break StopReason::FrameLimit;
            }

            let cycle_start = Instant::now();
            match orchestrator.step() {
                Ok(CycleOutcome::StreamEnded) => break StopReason::StreamEnded,
                Ok(CycleOutcome::Analysed(result)) => {
                    frames += 1;
                    if on_frame(&result, started.elapsed()).is_break() {
                        break StopReason::StoppedByCaller;
                    }
                }
                Err(e) => {
                    orchestrator.stop();
                    return Err(e);
                }
            }
            self.pace(cycle_start);
        };

        orchestrator.stop();
        log::info!("Session stopped after {frames} frames: {stop_reason:?}");
        Ok(SessionSummary {
            frames,
            stop_reason,
            elapsed: started.elapsed(),
        })
    }

    /// Sleeps for whatever is left of the frame interval.
    fn pace(&self, cycle_start: Instant) {
        if let Some(interval) = self.frame_interval {
            if let Some(remaining) = interval.checked_sub(cycle_start.elapsed()) {
                thread::sleep(remaining);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capture::domain::frame_source::FrameSource;
    use crate::capture::domain::stream_info::StreamInfo;
    use crate::pipeline::feature_flags::FeatureFlags;
    use crate::pipeline::orchestrator::{AnalysisComponents, OrchestratorState};
    use crate::pipeline::pipeline_logger::NullPipelineLogger;
    use crate::shared::frame::Frame;
    use rstest::rstest;

    /// Yields `remaining` blank frames, then ends.
    struct CountingSource {
        remaining: usize,
        next_index: usize,
        open: bool,
    }

    impl FrameSource for CountingSource {
        fn open(&mut self, source: &SourceId) -> Result<StreamInfo, AnalysisError> {
            if let SourceId::Path(_) = source {
                return Err(AnalysisError::CaptureUnavailable {
                    source_id: source.to_string(),
                    reason: "not found".into(),
                });
            }
            self.open = true;
            Ok(StreamInfo {
                width: 8,
                height: 8,
                fps: 0.0,
                label: source.to_string(),
            })
        }

        fn read(&mut self) -> Option<Frame> {
            if !self.open || self.remaining == 0 {
                self.open = false;
                return None;
            }
            self.remaining -= 1;
            self.next_index += 1;
            Some(Frame::new(vec![0; 8 * 8 * 3], 8, 8, 3, self.next_index - 1))
        }

        fn close(&mut self) {
            self.open = false;
        }

        fn is_open(&self) -> bool {
            self.open
        }
    }

    fn orchestrator(frames: usize) -> FrameAnalysisOrchestrator {
        FrameAnalysisOrchestrator::new(
            Box::new(CountingSource {
                remaining: frames,
                next_index: 0,
                open: false,
            }),
            AnalysisComponents::default(),
            FeatureFlags::default(),
            Box::new(NullPipelineLogger),
        )
        .unwrap()
    }

    #[test]
    fn test_runs_until_stream_ends() {
        let mut orch = orchestrator(4);
        let mut seen = Vec::new();
        let summary = SessionRunner::new(CancellationToken::new())
            .run(&mut orch, &SourceId::Device(0), |r, _| {
                seen.push(r.frame_index);
                ControlFlow::Continue(())
            })
            .unwrap();
        assert_eq!(summary.frames, 4);
        assert_eq!(summary.stop_reason, StopReason::StreamEnded);
        assert_eq!(seen, vec![0, 1, 2, 3]);
        assert_eq!(orch.state(), OrchestratorState::Idle);
    }

    #[test]
    fn test_frame_limit() {
        let mut orch = orchestrator(100);
        let summary = SessionRunner::new(CancellationToken::new())
            .with_max_frames(3)
            .run(&mut orch, &SourceId::Device(0), |_, _| ControlFlow::Continue(()))
            .unwrap();
        assert_eq!(summary.frames, 3);
        assert_eq!(summary.stop_reason, StopReason::FrameLimit);
        assert_eq!(orch.state(), OrchestratorState::Idle);
    }

    #[test]
    fn test_cancel_from_callback_completes_current_cycle() {
        let mut orch = orchestrator(100);
        let token = CancellationToken::new();
        let handle = token.clone();
        let summary = SessionRunner::new(token)
            .run(&mut orch, &SourceId::Device(0), |r, _| {
                if r.frame_index == 1 {
                    handle.cancel();
                }
                ControlFlow::Continue(())
            })
            .unwrap();
        assert_eq!(summary.frames, 2);
        assert_eq!(summary.stop_reason, StopReason::Cancelled);
    }

    #[test]
    fn test_cancelled_before_start_analyses_nothing() {
        let mut orch = orchestrator(5);
        let token = CancellationToken::new();
        token.cancel();
        let summary = SessionRunner::new(token)
            .run(&mut orch, &SourceId::Device(0), |_, _| ControlFlow::Continue(()))
            .unwrap();
        assert_eq!(summary.frames, 0);
        assert_eq!(summary.stop_reason, StopReason::Cancelled);
        assert_eq!(orch.state(), OrchestratorState::Idle);
    }

    #[test]
    fn test_callback_break_stops_session() {
        let mut orch = orchestrator(10);
        let summary = SessionRunner::new(CancellationToken::new())
            .run(&mut orch, &SourceId::Device(0), |_, _| ControlFlow::Break(()))
            .unwrap();
        assert_eq!(summary.frames, 1);
        assert_eq!(summary.stop_reason, StopReason::StoppedByCaller);
    }

    #[test]
    fn test_open_failure_propagates() {
        let mut orch = orchestrator(1);
        let err = SessionRunner::new(CancellationToken::new())
            .run(&mut orch, &SourceId::Path("missing.mp4".into()), |_, _| {
                ControlFlow::Continue(())
            })
            .unwrap_err();
        assert!(matches!(err, AnalysisError::CaptureUnavailable { .. }));
        assert_eq!(orch.state(), OrchestratorState::Idle);
    }

    #[test]
    fn test_target_fps_paces_cycles() {
        let mut orch = orchestrator(3);
        let summary = SessionRunner::new(CancellationToken::new())
            .with_target_fps(50.0)
            .run(&mut orch, &SourceId::Device(0), |_, _| ControlFlow::Continue(()))
            .unwrap();
        // Three paced cycles at 20ms each.
        assert!(summary.elapsed >= Duration::from_millis(55));
    }

    #[rstest]
    #[case(0.0)]
    #[case(-5.0)]
    #[case(f64::NAN)]
    #[case(1e-300)]
    #[case(f64::MIN_POSITIVE)]
    fn test_unusable_fps_is_uncapped(#[case] fps: f64) {
        let runner = SessionRunner::new(CancellationToken::new()).with_target_fps(fps);
        assert!(runner.frame_interval.is_none());
    }

    #[test]
    fn test_fps_sets_frame_interval() {
        let runner = SessionRunner::new(CancellationToken::new()).with_target_fps(4.0);
        assert_eq!(runner.frame_interval, Some(Duration::from_millis(250)));
    }

    #[test]
    fn test_token_clones_share_state() {
        let a = CancellationToken::new();
        let b = a.clone();
        assert!(!b.is_cancelled());
        a.cancel();
        assert!(b.is_cancelled());
    }
}
