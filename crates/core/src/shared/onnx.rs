use std::path::Path;

use ort::session::Session;

use crate::shared::error::AnalysisError;

/// Opens an ONNX Runtime session for the model at `model_path`.
pub fn load_session(model_path: &Path) -> Result<Session, AnalysisError> {
    log::info!("Loading ONNX model {}", model_path.display());
    let session = Session::builder()
        .map_err(AnalysisError::inference)?
        .commit_from_file(model_path)
        .map_err(|e| AnalysisError::Inference(format!("{}: {e}", model_path.display())))?;
    Ok(session)
}
