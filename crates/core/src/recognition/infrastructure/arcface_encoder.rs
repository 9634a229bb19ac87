/// ArcFace embedding encoder using ONNX Runtime.
///
/// Produces identity embeddings from a 112x112 face crop; far more robust
/// to lighting and pose than the histogram encoder.
use std::path::Path;

use crate::recognition::domain::face_embedding::FaceEmbedding;
use crate::recognition::domain::face_encoder::FaceEncoder;
use crate::shared::error::AnalysisError;
use crate::shared::frame::Frame;
use crate::shared::math::l2_normalize;
use crate::shared::onnx::load_session;
use crate::shared::region::FaceBox;

/// Euclidean distance between unit embeddings; 1.0 is cosine similarity 0.5.
pub const DEFAULT_TOLERANCE: f64 = 1.0;

const INPUT_SIZE: usize = 112;
const NORM_MEAN: f32 = 127.5;
const NORM_STD: f32 = 127.5;

pub struct ArcFaceEncoder {
    session: ort::session::Session,
}

impl ArcFaceEncoder {
    pub fn new(model_path: &Path) -> Result<Self, AnalysisError> {
        Ok(Self {
            session: load_session(model_path)?,
        })
    }
}

impl FaceEncoder for ArcFaceEncoder {
    fn encode(
        &mut self,
        frame: &Frame,
        face: &FaceBox,
    ) -> Result<Option<FaceEmbedding>, Box<dyn std::error::Error>> {
        let Some(crop) = frame.crop(face) else {
            return Ok(None);
        };
        let tensor = preprocess(&crop);
        let input_value = ort::value::Tensor::from_array(tensor)?;
        let outputs = self.session.run(ort::inputs![input_value])?;
        let embedding_array = outputs[0].try_extract_array::<f32>()?;
        let embedding_slice = embedding_array
            .as_slice()
            .ok_or("Cannot get embedding slice")?;

        let mut embedding = embedding_slice.to_vec();
        l2_normalize(&mut embedding);
        Ok(Some(FaceEmbedding::new(embedding)))
    }

    fn default_tolerance(&self) -> f64 {
        DEFAULT_TOLERANCE
    }
}

/// Resize crop to 112x112, normalize to [-1, 1], NCHW layout.
fn preprocess(crop: &Frame) -> ndarray::Array4<f32> {
    let src = crop.as_ndarray();
    let src_w = crop.width() as usize;
    let src_h = crop.height() as usize;
    let channels = crop.channels() as usize;

    let mut tensor = ndarray::Array4::<f32>::zeros((1, 3, INPUT_SIZE, INPUT_SIZE));
    for y in 0..INPUT_SIZE {
        let src_y = (((y as f64 + 0.5) * src_h as f64 / INPUT_SIZE as f64) as usize).min(src_h - 1);
        for x in 0..INPUT_SIZE {
            let src_x =
                (((x as f64 + 0.5) * src_w as f64 / INPUT_SIZE as f64) as usize).min(src_w - 1);
            for c in 0..3 {
                let v = src[[src_y, src_x, c.min(channels - 1)]] as f32;
                tensor[[0, c, y, x]] = (v - NORM_MEAN) / NORM_STD;
            }
        }
    }
    tensor
}
