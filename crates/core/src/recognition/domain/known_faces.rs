use crate::recognition::domain::face_embedding::FaceEmbedding;

#[derive(Clone, Debug, PartialEq)]
pub struct KnownFaceEntry {
    pub label: String,
    pub embedding: FaceEmbedding,
}

/// Reference embeddings for one session.
///
/// Built once through [`KnownFacesBuilder`] and immutable afterwards; the
/// only way to change the set is to build a new one.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct KnownFaces {
    entries: Vec<KnownFaceEntry>,
}

impl KnownFaces {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn entries(&self) -> &[KnownFaceEntry] {
        &self.entries
    }

    /// Labels in load order.
    pub fn names(&self) -> Vec<String> {
        self.entries.iter().map(|e| e.label.clone()).collect()
    }

    /// Nearest entry and its distance. Ties go to the earliest entry.
    pub fn closest(&self, embedding: &FaceEmbedding) -> Option<(&KnownFaceEntry, f64)> {
        let mut best: Option<(&KnownFaceEntry, f64)> = None;
        for entry in &self.entries {
            let d = entry.embedding.distance(embedding);
            match best {
                Some((_, best_d)) if d >= best_d => {}
                _ => best = Some((entry, d)),
            }
        }
        best
    }

    /// Label of the nearest entry if it lies within `tolerance`.
    pub fn match_label(&self, embedding: &FaceEmbedding, tolerance: f64) -> Option<&str> {
        self.closest(embedding)
            .filter(|(_, d)| *d <= tolerance)
            .map(|(entry, _)| entry.label.as_str())
    }
}

/// Append-only collector used while loading reference images.
#[derive(Debug, Default)]
pub struct KnownFacesBuilder {
    entries: Vec<KnownFaceEntry>,
}

impl KnownFacesBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, label: impl Into<String>, embedding: FaceEmbedding) {
        self.entries.push(KnownFaceEntry {
            label: label.into(),
            embedding,
        });
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn build(self) -> KnownFaces {
        KnownFaces {
            entries: self.entries,
        }
    }
}
