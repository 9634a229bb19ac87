pub mod analysis_session_factory;
pub mod feature_flags;
pub mod frame_analysis;
pub mod orchestrator;
pub mod pipeline_logger;
pub mod session_recorder;
pub mod session_runner;
pub mod status_summary;
