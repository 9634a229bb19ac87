use std::path::Path;
use std::time::Instant;

use crate::capture::domain::frame_source::FrameSource;
use crate::capture::domain::source_id::SourceId;
use crate::capture::domain::stream_info::StreamInfo;
use crate::detection::domain::face_detector::FaceDetector;
use crate::motion::domain::motion_detector::MotionDetector;
use crate::pipeline::feature_flags::{FeatureFlags, StagePlan};
use crate::pipeline::frame_analysis::{FrameAnalysisResult, RecognitionStatus};
use crate::pipeline::pipeline_logger::PipelineLogger;
use crate::pipeline::status_summary::summarize;
use crate::recognition::face_recognizer::FaceRecognizer;
use crate::shared::constants::UNKNOWN_LABEL;
use crate::shared::error::AnalysisError;
use crate::shared::frame::Frame;

/// Detectors for one session. Any may be absent; its stage is then skipped
/// even when its flag is set.
#[derive(Default)]
pub struct AnalysisComponents {
    pub motion: Option<Box<dyn MotionDetector>>,
    pub faces: Option<Box<dyn FaceDetector>>,
    pub recognizer: Option<FaceRecognizer>,
}

impl AnalysisComponents {
    /// Checks that every stage `flags` enable has a component to run it.
    pub fn check_supports(&self, flags: FeatureFlags) -> Result<(), AnalysisError> {
        let missing = [
            (flags.motion && self.motion.is_none(), "motion detection"),
            (flags.face_detection && self.faces.is_none(), "face detection"),
            (flags.face_recognition && self.recognizer.is_none(), "face recognition"),
        ];
        match missing.iter().find(|(absent, _)| *absent) {
            Some((_, stage)) => Err(AnalysisError::Configuration(format!(
                "{stage} was not configured for this session"
            ))),
            None => Ok(()),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum OrchestratorState {
    Idle,
    Active,
}

#[derive(Clone, Debug, PartialEq)]
pub enum CycleOutcome {
    Analysed(FrameAnalysisResult),
    /// The source ended or failed; the orchestrator is `Idle` again.
    StreamEnded,
}

/// Composes motion detection, face detection and recognition per frame.
///
/// `Idle -> Active` on [`start`](Self::start); back to `Idle` on
/// [`stop`](Self::stop) or when the source stops yielding frames. Each
/// [`step`](Self::step) reads exactly one frame and runs the stages the
/// current flags select.
pub struct FrameAnalysisOrchestrator {
    source: Box<dyn FrameSource>,
    components: AnalysisComponents,
    logger: Box<dyn PipelineLogger>,
    flags: FeatureFlags,
    state: OrchestratorState,
    stream: Option<StreamInfo>,
    frames_analysed: usize,
}

impl FrameAnalysisOrchestrator {
    /// Fails when `flags` enable a stage whose component is absent.
    pub fn new(
        source: Box<dyn FrameSource>,
        components: AnalysisComponents,
        flags: FeatureFlags,
        logger: Box<dyn PipelineLogger>,
    ) -> Result<Self, AnalysisError> {
        components.check_supports(flags)?;
        Ok(Self {
            source,
            components,
            logger,
            flags,
            state: OrchestratorState::Idle,
            stream: None,
            frames_analysed: 0,
        })
    }

    pub fn state(&self) -> OrchestratorState {
        self.state
    }

    pub fn flags(&self) -> FeatureFlags {
        self.flags
    }

    /// Takes effect on the next cycle. Detectors and their history persist.
    ///
    /// Enabling a stage that was not built for this session is a
    /// [`AnalysisError::Configuration`] error and leaves the flags unchanged.
    pub fn set_flags(&mut self, flags: FeatureFlags) -> Result<(), AnalysisError> {
        self.components.check_supports(flags)?;
        self.flags = flags;
        Ok(())
    }

    pub fn stream_info(&self) -> Option<&StreamInfo> {
        self.stream.as_ref()
    }

    pub fn frames_analysed(&self) -> usize {
        self.frames_analysed
    }

    pub fn logger(&self) -> &dyn PipelineLogger {
        self.logger.as_ref()
    }

    pub fn start(&mut self, source_id: &SourceId) -> Result<StreamInfo, AnalysisError> {
        if self.state == OrchestratorState::Active {
            return Err(AnalysisError::InvalidState(
                "analysis session already active".into(),
            ));
        }
        let info = self.source.open(source_id)?;
        self.logger.info(&format!(
            "Analysing {} ({}x{} @ {:.1} fps)",
            info.label, info.width, info.height, info.fps
        ));
        self.state = OrchestratorState::Active;
        self.stream = Some(info.clone());
        self.frames_analysed = 0;
        Ok(info)
    }

    /// Runs one cycle.
    pub fn step(&mut self) -> Result<CycleOutcome, AnalysisError> {
        if self.state != OrchestratorState::Active {
            return Err(AnalysisError::InvalidState(
                "analysis session not started".into(),
            ));
        }
        let frame = if self.source.is_open() {
            self.source.read()
        } else {
            None
        };
        let Some(frame) = frame else {
            self.logger.info("Stream ended");
            self.stop();
            return Ok(CycleOutcome::StreamEnded);
        };

        let result = self.analyse(&frame);
        self.frames_analysed += 1;
        self.logger.progress(self.frames_analysed);
        Ok(CycleOutcome::Analysed(result))
    }

    /// Releases the source and returns to `Idle`. Idempotent.
    pub fn stop(&mut self) {
        self.source.close();
        self.state = OrchestratorState::Idle;
    }

    /// Runs the stages selected by the current flags on `frame`.
    pub fn analyse(&mut self, frame: &Frame) -> FrameAnalysisResult {
        let plan = StagePlan::for_flags(self.flags);
        let mut result = FrameAnalysisResult {
            frame_index: frame.index(),
            ..FrameAnalysisResult::default()
        };

        if let Some(motion) = self.components.motion.as_mut().filter(|_| plan.motion) {
            let t = Instant::now();
            let outcome = motion.detect(frame);
            self.logger.timing("motion", elapsed_ms(t));
            self.logger.metric("motion_regions", outcome.regions.len() as f64);
            result.motion_detected = outcome.motion_detected;
            result.motion_regions = outcome.regions;
        }

        let mut detection_ran = false;
        if let Some(faces) = self.components.faces.as_mut().filter(|_| plan.face_detection) {
            let t = Instant::now();
            match faces.detect(frame) {
                Ok(boxes) => result.face_boxes = boxes,
                Err(e) => log::warn!("Face detection failed on frame {}: {e}", frame.index()),
            }
            self.logger.timing("faces", elapsed_ms(t));
            self.logger.metric("faces", result.face_boxes.len() as f64);
            detection_ran = true;
        }

        if plan.recognition && detection_ran {
            let (identities, status) = self.recognize(frame, &result);
            result.identities = identities;
            result.recognition = status;
        }

        result.status = summarize(
            result.motion_detected,
            result.face_boxes.len(),
            result.recognition,
            &result.identities,
        );
        result
    }

    fn recognize(
        &mut self,
        frame: &Frame,
        result: &FrameAnalysisResult,
    ) -> (Vec<String>, RecognitionStatus) {
        let boxes = &result.face_boxes;
        let all_unknown = || vec![UNKNOWN_LABEL.to_string(); boxes.len()];

        let Some(recognizer) = self.components.recognizer.as_mut() else {
            return (all_unknown(), RecognitionStatus::NoKnownFaces);
        };
        let status = if recognizer.is_degraded() {
            RecognitionStatus::NoKnownFaces
        } else {
            RecognitionStatus::Recognized
        };
        if boxes.is_empty() {
            return (Vec::new(), status);
        }

        let t = Instant::now();
        let labels = recognizer.recognize_faces(frame, boxes).unwrap_or_else(|e| {
            log::warn!("Recognition failed on frame {}: {e}", frame.index());
            all_unknown()
        });
        self.logger.timing("recognition", elapsed_ms(t));
        (labels, status)
    }

    /// Replaces the known-face set. Only allowed while `Idle`.
    pub fn reload_known_faces(&mut self, dir: &Path) -> Result<usize, AnalysisError> {
        if self.state == OrchestratorState::Active {
            return Err(AnalysisError::InvalidState(
                "known faces can only be reloaded while idle".into(),
            ));
        }
        let recognizer = self.components.recognizer.as_mut().ok_or_else(|| {
            AnalysisError::Configuration("face recognition is not configured".into())
        })?;
        Ok(recognizer.load_known_faces(dir))
    }

    pub fn known_face_names(&self) -> Vec<String> {
        self.components
            .recognizer
            .as_ref()
            .map(FaceRecognizer::known_face_names)
            .unwrap_or_default()
    }

    pub fn recognizer(&self) -> Option<&FaceRecognizer> {
        self.components.recognizer.as_ref()
    }
}

impl Drop for FrameAnalysisOrchestrator {
    fn drop(&mut self) {
        self.source.close();
    }
}

fn elapsed_ms(start: Instant) -> f64 {
    start.elapsed().as_secs_f64() * 1000.0
}
