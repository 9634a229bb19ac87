use std::fs;
use std::ops::ControlFlow;
use std::path::{Path, PathBuf};
use std::process;

use clap::Parser;

use triage_core::capture::domain::source_id::SourceId;
use triage_core::config::AnalysisConfig;
use triage_core::pipeline::analysis_session_factory::create_orchestrator;
use triage_core::pipeline::feature_flags::FeatureFlags;
use triage_core::pipeline::pipeline_logger::StdoutPipelineLogger;
use triage_core::pipeline::session_recorder::SessionRecorder;
use triage_core::pipeline::session_runner::{CancellationToken, SessionRunner};
use triage_core::report::video_analysis_results::{
    render_video_analysis_section, VideoAnalysisResults,
};

/// Live motion, face and identity analysis of a camera or video stream.
#[derive(Parser)]
#[command(name = "iot-triage")]
struct Cli {
    /// Settings file (defaults to the platform config directory).
    #[arg(long)]
    config: Option<PathBuf>,

    /// Capture device index, video file or stream URL.
    #[arg(long, default_value = "0")]
    source: SourceId,

    /// Enable motion detection.
    #[arg(long)]
    motion: bool,

    /// Enable face detection.
    #[arg(long)]
    faces: bool,

    /// Enable identity recognition (implies --faces).
    #[arg(long)]
    recognize: bool,

    /// Directory of reference portraits, one identity per file.
    #[arg(long)]
    known_faces: Option<PathBuf>,

    /// Motion algorithm: mog2, knn or frame_diff.
    #[arg(long)]
    motion_algorithm: Option<String>,

    /// Face model: fast or accurate.
    #[arg(long)]
    face_model: Option<String>,

    /// Face encoder: histogram or arcface.
    #[arg(long)]
    encoder: Option<String>,

    /// Reference portraits are already cropped to the face.
    #[arg(long)]
    references_cropped: bool,

    /// Stop after this many analysed frames.
    #[arg(long)]
    max_frames: Option<usize>,

    /// Cap the analysis rate.
    #[arg(long)]
    fps: Option<f64>,

    /// Write the session findings as JSON.
    #[arg(long)]
    report: Option<PathBuf>,
}

fn main() {
    env_logger::init();

    if let Err(e) = run() {
        eprintln!("Error: {e}");
        process::exit(1);
    }
}

fn run() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    validate(&cli)?;
    let config = build_config(&cli)?;
    if !config.features.any() {
        log::warn!("No analysis stages enabled; every frame will report no detections");
    }

    let cancel = CancellationToken::new();
    let handler_token = cancel.clone();
    ctrlc::set_handler(move || handler_token.cancel())?;

    let mut orchestrator =
        create_orchestrator(&config, Box::new(StdoutPipelineLogger::default()))?;
    if let Some(recognizer) = orchestrator.recognizer() {
        for warning in recognizer.warnings() {
            eprintln!("Warning: {warning}");
        }
    }

    let mut runner = SessionRunner::new(cancel);
    if let Some(fps) = config.target_fps {
        runner = runner.with_target_fps(fps);
    }
    if let Some(max) = cli.max_frames {
        runner = runner.with_max_frames(max);
    }

    let mut recorder = SessionRecorder::new(cli.source.to_string());
    let summary = runner.run(&mut orchestrator, &cli.source, |result, elapsed| {
        log::info!("frame {}: {}", result.frame_index, result.status);
        recorder.record(result, elapsed);
        ControlFlow::Continue(())
    })?;
    orchestrator.logger().summary();
    log::info!(
        "Analysed {} frames in {:.1}s ({:?})",
        summary.frames,
        summary.elapsed.as_secs_f64(),
        summary.stop_reason
    );

    let mut findings = recorder.finish();
    if let Some(info) = orchestrator.stream_info() {
        findings.video_filename = info.label.clone();
    }
    print!("{}", render_video_analysis_section(Some(&findings)));
    if let Some(path) = &cli.report {
        write_report(path, &findings)?;
        log::info!("Report written to {}", path.display());
    }
    Ok(())
}

/// Config file values, overridden by whatever was given on the command line.
fn build_config(cli: &Cli) -> Result<AnalysisConfig, Box<dyn std::error::Error>> {
    let mut config = match &cli.config {
        Some(path) => AnalysisConfig::load(path)?,
        None => AnalysisConfig::load_default(),
    };

    if cli.motion || cli.faces || cli.recognize {
        config.features = FeatureFlags {
            motion: cli.motion,
            face_detection: cli.faces || cli.recognize,
            face_recognition: cli.recognize,
        };
    }
    if let Some(dir) = &cli.known_faces {
        config.known_faces_dir = Some(dir.clone());
    }
    if let Some(name) = &cli.motion_algorithm {
        config.motion_algorithm = name.clone();
    }
    if let Some(name) = &cli.face_model {
        config.face_model = name.clone();
    }
    if let Some(name) = &cli.encoder {
        config.encoder = name.clone();
    }
    if cli.references_cropped {
        config.references_cropped = true;
    }
    if cli.fps.is_some() {
        config.target_fps = cli.fps;
    }
    Ok(config)
}

fn validate(cli: &Cli) -> Result<(), Box<dyn std::error::Error>> {
    if let Some(fps) = cli.fps {
        if fps <= 0.0 || !fps.is_finite() {
            return Err(format!("FPS must be a positive number, got {fps}").into());
        }
    }
    if cli.max_frames == Some(0) {
        return Err("--max-frames must be at least 1".into());
    }
    if let Some(dir) = &cli.known_faces {
        if !dir.is_dir() {
            log::warn!("Known faces directory not found: {}", dir.display());
        }
    }
    Ok(())
}

fn write_report(path: &Path, findings: &VideoAnalysisResults) -> Result<(), Box<dyn std::error::Error>> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, serde_json::to_string_pretty(findings)?)?;
    Ok(())
}
