use std::path::Path;

use crate::recognition::domain::encoder_kind::EncoderKind;
use crate::recognition::domain::face_encoder::FaceEncoder;
use crate::shared::constants::ARCFACE_MODEL;
use crate::shared::error::AnalysisError;
use crate::shared::model_resolver;

use super::arcface_encoder::ArcFaceEncoder;
use super::histogram_face_encoder::HistogramFaceEncoder;

pub fn create_face_encoder(
    kind: EncoderKind,
    model_dir: Option<&Path>,
) -> Result<Box<dyn FaceEncoder>, AnalysisError> {
    log::info!("Using {kind} face encoder");
    match kind {
        EncoderKind::Histogram => Ok(Box::new(HistogramFaceEncoder)),
        EncoderKind::Arcface => {
            let path = model_resolver::resolve(&ARCFACE_MODEL, model_dir)?;
            Ok(Box::new(ArcFaceEncoder::new(&path)?))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_histogram_encoder_needs_no_model() {
        let encoder = create_face_encoder(EncoderKind::Histogram, None).unwrap();
        assert!((encoder.default_tolerance() - 0.6).abs() < 1e-9);
    }
}
