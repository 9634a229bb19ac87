use crate::shared::math::euclidean_distance;

/// Fixed-length appearance vector for one face, L2-normalised by the
/// encoder that produced it.
#[derive(Clone, Debug, PartialEq)]
pub struct FaceEmbedding(Vec<f32>);

impl FaceEmbedding {
    pub fn new(values: Vec<f32>) -> Self {
        Self(values)
    }

    pub fn as_slice(&self) -> &[f32] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Euclidean distance. Embeddings of different lengths come from
    /// different encoders and are infinitely far apart.
    pub fn distance(&self, other: &FaceEmbedding) -> f64 {
        if self.len() != other.len() {
            return f64::INFINITY;
        }
        euclidean_distance(&self.0, &other.0)
    }
}
