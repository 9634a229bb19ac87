use crate::capture::infrastructure::ffmpeg_stream_source::FfmpegStreamSource;
use crate::config::AnalysisConfig;
use crate::detection::domain::face_detector::FaceDetector;
use crate::detection::domain::face_model::FaceModel;
use crate::detection::infrastructure::face_detector_factory::create_face_detector;
use crate::detection::infrastructure::full_frame_detector::FullFrameFaceDetector;
use crate::motion::domain::motion_algorithm::MotionAlgorithm;
use crate::motion::infrastructure::motion_detector_factory::create_motion_detector;
use crate::pipeline::orchestrator::{AnalysisComponents, FrameAnalysisOrchestrator};
use crate::pipeline::pipeline_logger::PipelineLogger;
use crate::recognition::domain::encoder_kind::EncoderKind;
use crate::recognition::face_recognizer::FaceRecognizer;
use crate::recognition::infrastructure::face_encoder_factory::create_face_encoder;
use crate::shared::error::AnalysisError;

/// Builds the detectors `config` asks for.
///
/// Every name is parsed before any model is loaded, so a typo fails fast
/// even for a stage that is switched off. Face models are only loaded when
/// detection or recognition is enabled.
pub fn build_components(config: &AnalysisConfig) -> Result<AnalysisComponents, AnalysisError> {
    let algorithm: MotionAlgorithm = config.motion_algorithm.parse()?;
    let face_model: FaceModel = config.face_model.parse()?;
    let encoder_kind: EncoderKind = config.encoder.parse()?;
    let features = config.features;
    let model_dir = config.model_dir.as_deref();

    let motion = Some(create_motion_detector(algorithm, &config.motion_params())?);

    let faces = if features.face_detection || features.face_recognition {
        Some(create_face_detector(face_model, config.face_confidence, model_dir)?)
    } else {
        None
    };

    let recognizer = if features.face_recognition {
        let reference_detector: Box<dyn FaceDetector> = if config.references_cropped {
            Box::new(FullFrameFaceDetector)
        } else {
            create_face_detector(face_model, config.face_confidence, model_dir)?
        };
        let encoder = create_face_encoder(encoder_kind, model_dir)?;
        let mut recognizer =
            FaceRecognizer::new(encoder, reference_detector, config.recognition_tolerance);
        match &config.known_faces_dir {
            Some(dir) => {
                recognizer.load_known_faces(dir);
            }
            None => log::warn!("No known faces directory configured; faces will be Unknown"),
        }
        Some(recognizer)
    } else {
        None
    };

    Ok(AnalysisComponents {
        motion,
        faces,
        recognizer,
    })
}

/// An orchestrator over an ffmpeg capture source, ready to `start`.
///
/// Only the stages enabled in `config.features` are built, so only those
/// can be switched back on with `set_flags` later in the session.
pub fn create_orchestrator(
    config: &AnalysisConfig,
    logger: Box<dyn PipelineLogger>,
) -> Result<FrameAnalysisOrchestrator, AnalysisError> {
    let components = build_components(config)?;
    FrameAnalysisOrchestrator::new(
        Box::new(FfmpegStreamSource::new()),
        components,
        config.features,
        logger,
    )
}
