use crate::recognition::domain::face_embedding::FaceEmbedding;
use crate::shared::frame::Frame;
use crate::shared::region::FaceBox;

/// Domain interface for turning a face crop into an embedding.
pub trait FaceEncoder: Send {
    /// Embeds the face inside `face`. Returns `Ok(None)` when the box does
    /// not overlap the frame.
    fn encode(
        &mut self,
        frame: &Frame,
        face: &FaceBox,
    ) -> Result<Option<FaceEmbedding>, Box<dyn std::error::Error>>;

    /// Distance at or below which two embeddings from this encoder are the
    /// same person.
    fn default_tolerance(&self) -> f64;
}
