use std::fs;
use std::path::{Path, PathBuf};

use crate::capture::infrastructure::image_file_loader::{is_image, load_rgb_frame};
use crate::detection::domain::face_detector::FaceDetector;
use crate::recognition::domain::face_encoder::FaceEncoder;
use crate::recognition::domain::known_faces::{KnownFaces, KnownFacesBuilder};
use crate::shared::constants::UNKNOWN_LABEL;
use crate::shared::frame::Frame;
use crate::shared::region::FaceBox;

/// Matches detected faces against a reference set loaded from disk.
///
/// Reference images are run through `reference_detector` to find the face,
/// then through the same encoder used for live frames.
pub struct FaceRecognizer {
    encoder: Box<dyn FaceEncoder>,
    reference_detector: Box<dyn FaceDetector>,
    tolerance: f64,
    known: KnownFaces,
    warnings: Vec<String>,
}

impl FaceRecognizer {
    /// `tolerance` defaults to the encoder's own when `None`.
    pub fn new(
        encoder: Box<dyn FaceEncoder>,
        reference_detector: Box<dyn FaceDetector>,
        tolerance: Option<f64>,
    ) -> Self {
        let tolerance = tolerance.unwrap_or_else(|| encoder.default_tolerance());
        Self {
            encoder,
            reference_detector,
            tolerance,
            known: KnownFaces::empty(),
            warnings: Vec::new(),
        }
    }

    /// Replaces the known-face set with one embedding per image in `dir`.
    ///
    /// Never fails: a missing directory, unreadable image, or image without
    /// a detectable face is recorded as a warning and skipped. When an image
    /// holds several faces only the first detection is used. Labels are the
    /// file stems, loaded in sorted file-name order. Returns the number of
    /// identities loaded.
    pub fn load_known_faces(&mut self, dir: &Path) -> usize {
        self.warnings.clear();
        let mut builder = KnownFacesBuilder::new();

        match reference_images(dir) {
            Ok(paths) => {
                for path in paths {
                    self.load_reference(&path, &mut builder);
                }
            }
            Err(reason) => self.warn(reason),
        }

        if builder.is_empty() {
            self.warn(format!(
                "No known faces loaded from {}; every face will be labelled {UNKNOWN_LABEL}",
                dir.display()
            ));
        } else {
            log::info!("Loaded {} known faces from {}", builder.len(), dir.display());
        }
        self.known = builder.build();
        self.known.len()
    }

    fn load_reference(&mut self, path: &Path, builder: &mut KnownFacesBuilder) {
        let Some(label) = path.file_stem().and_then(|s| s.to_str()).map(str::to_string) else {
            self.warn(format!("Skipping {}: file name is not valid UTF-8", path.display()));
            return;
        };

        let frame = match load_rgb_frame(path) {
            Ok(frame) => frame,
            Err(e) => {
                self.warn(format!("Skipping {label}: {e}"));
                return;
            }
        };

        let faces = match self.reference_detector.detect(&frame) {
            Ok(faces) => faces,
            Err(e) => {
                self.warn(format!("Skipping {label}: face detection failed: {e}"));
                return;
            }
        };
        let Some(first) = faces.first() else {
            self.warn(format!("Skipping {label}: no face found in {}", path.display()));
            return;
        };
        if faces.len() > 1 {
            log::debug!("{label}: {} faces found, using the first", faces.len());
        }

        match self.encoder.encode(&frame, first) {
            Ok(Some(embedding)) => builder.push(label, embedding),
            Ok(None) => self.warn(format!("Skipping {label}: face box is outside the image")),
            Err(e) => self.warn(format!("Skipping {label}: encoding failed: {e}")),
        }
    }

    /// One label per box, in order: a known identity or `"Unknown"`.
    ///
    /// With no known faces every box is `"Unknown"` and nothing is encoded.
    pub fn recognize_faces(
        &mut self,
        frame: &Frame,
        boxes: &[FaceBox],
    ) -> Result<Vec<String>, Box<dyn std::error::Error>> {
        if boxes.is_empty() {
            return Ok(Vec::new());
        }
        if self.known.is_empty() {
            return Ok(vec![UNKNOWN_LABEL.to_string(); boxes.len()]);
        }

        let mut labels = Vec::with_capacity(boxes.len());
        for face in boxes {
            let label = match self.encoder.encode(frame, face)? {
                Some(embedding) => self
                    .known
                    .match_label(&embedding, self.tolerance)
                    .unwrap_or(UNKNOWN_LABEL),
                None => UNKNOWN_LABEL,
            };
            labels.push(label.to_string());
        }
        Ok(labels)
    }

    pub fn known_face_names(&self) -> Vec<String> {
        self.known.names()
    }

    /// Warnings from the most recent load.
    pub fn warnings(&self) -> &[String] {
        &self.warnings
    }

    /// Recognition runs but can only answer "Unknown".
    pub fn is_degraded(&self) -> bool {
        self.known.is_empty()
    }

    pub fn tolerance(&self) -> f64 {
        self.tolerance
    }

    fn warn(&mut self, message: String) {
        log::warn!("{message}");
        self.warnings.push(message);
    }
}

/// Image files directly inside `dir`, sorted by file name.
fn reference_images(dir: &Path) -> Result<Vec<PathBuf>, String> {
    if !dir.is_dir() {
        return Err(format!("Known faces directory {} does not exist", dir.display()));
    }
    let entries = fs::read_dir(dir)
        .map_err(|e| format!("Cannot read known faces directory {}: {e}", dir.display()))?;
    let mut paths: Vec<PathBuf> = entries
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|p| p.is_file() && is_image(p))
        .collect();
    paths.sort();
    Ok(paths)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::detection::infrastructure::full_frame_detector::FullFrameFaceDetector;
    use crate::recognition::domain::face_embedding::FaceEmbedding;
    use crate::recognition::infrastructure::histogram_face_encoder::HistogramFaceEncoder;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    /// Wraps the histogram encoder and counts calls.
    struct CountingEncoder {
        calls: Arc<AtomicUsize>,
    }

    impl FaceEncoder for CountingEncoder {
        fn encode(
            &mut self,
            frame: &Frame,
            face: &FaceBox,
        ) -> Result<Option<FaceEmbedding>, Box<dyn std::error::Error>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            HistogramFaceEncoder.encode(frame, face)
        }

        fn default_tolerance(&self) -> f64 {
            0.6
        }
    }

    /// Finds nothing, like a detector run on a landscape photo.
    struct NoFaceDetector;

    impl FaceDetector for NoFaceDetector {
        fn detect(&mut self, _frame: &Frame) -> Result<Vec<FaceBox>, Box<dyn std::error::Error>> {
            Ok(Vec::new())
        }
    }

    fn recognizer() -> FaceRecognizer {
        FaceRecognizer::new(
            Box::new(HistogramFaceEncoder),
            Box::new(FullFrameFaceDetector),
            None,
        )
    }

    fn counting_recognizer() -> (FaceRecognizer, Arc<AtomicUsize>) {
        let calls = Arc::new(AtomicUsize::new(0));
        let r = FaceRecognizer::new(
            Box::new(CountingEncoder {
                calls: Arc::clone(&calls),
            }),
            Box::new(FullFrameFaceDetector),
            None,
        );
        (r, calls)
    }

    fn save_square(dir: &Path, name: &str, rgb: [u8; 3]) {
        image::RgbImage::from_pixel(64, 64, image::Rgb(rgb))
            .save(dir.join(name))
            .unwrap();
    }

    fn solid(w: u32, h: u32, rgb: [u8; 3]) -> Frame {
        Frame::new(rgb.repeat((w * h) as usize), w, h, 3, 0)
    }

    #[test]
    fn test_nonexistent_directory_leaves_set_empty() {
        let mut r = recognizer();
        let loaded = r.load_known_faces(Path::new("/nonexistent/known_faces"));
        assert_eq!(loaded, 0);
        assert!(r.known_face_names().is_empty());
        assert!(r.is_degraded());
        assert!(r.warnings().iter().any(|w| w.contains("does not exist")));
    }

    #[test]
    fn test_solid_square_reference_is_loaded_by_stem() {
        let dir = tempfile::tempdir().unwrap();
        save_square(dir.path(), "personA.png", [220, 20, 20]);
        let mut r = recognizer();
        assert_eq!(r.load_known_faces(dir.path()), 1);
        assert_eq!(r.known_face_names(), vec!["personA"]);
        assert!(!r.is_degraded());
    }

    #[test]
    fn test_unrelated_face_is_unknown_and_matching_face_is_named() {
        let dir = tempfile::tempdir().unwrap();
        save_square(dir.path(), "personA.png", [220, 20, 20]);
        let mut r = recognizer();
        r.load_known_faces(dir.path());

        let frame = solid(100, 100, [20, 20, 220]);
        let boxes = [FaceBox::new(10, 60, 60, 10)];
        assert_eq!(r.recognize_faces(&frame, &boxes).unwrap(), vec!["Unknown"]);

        let frame = solid(100, 100, [220, 20, 20]);
        assert_eq!(r.recognize_faces(&frame, &boxes).unwrap(), vec!["personA"]);
    }

    #[test]
    fn test_empty_box_list_gives_empty_labels() {
        let dir = tempfile::tempdir().unwrap();
        save_square(dir.path(), "personA.png", [220, 20, 20]);
        let mut r = recognizer();
        r.load_known_faces(dir.path());
        assert!(r.recognize_faces(&solid(10, 10, [0, 0, 0]), &[]).unwrap().is_empty());
    }

    #[test]
    fn test_empty_database_labels_all_unknown_without_encoding() {
        let (mut r, calls) = counting_recognizer();
        let boxes = [FaceBox::new(0, 5, 5, 0), FaceBox::new(5, 10, 10, 5), FaceBox::new(0, 10, 10, 0)];
        let labels = r.recognize_faces(&solid(10, 10, [9, 9, 9]), &boxes).unwrap();
        assert_eq!(labels, vec!["Unknown"; 3]);
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_label_count_matches_box_count() {
        let dir = tempfile::tempdir().unwrap();
        save_square(dir.path(), "alice.png", [220, 20, 20]);
        let (mut r, calls) = counting_recognizer();
        r.load_known_faces(dir.path());
        let before = calls.load(Ordering::SeqCst);

        let boxes = [
            FaceBox::new(0, 10, 10, 0),
            FaceBox::new(200, 210, 210, 200), // outside the frame
        ];
        let labels = r.recognize_faces(&solid(20, 20, [220, 20, 20]), &boxes).unwrap();
        assert_eq!(labels, vec!["alice", "Unknown"]);
        assert_eq!(calls.load(Ordering::SeqCst) - before, 2);
    }

    #[test]
    fn test_sorted_order_and_non_images_ignored() {
        let dir = tempfile::tempdir().unwrap();
        save_square(dir.path(), "zoe.png", [20, 220, 20]);
        save_square(dir.path(), "adam.bmp", [20, 20, 220]);
        fs::write(dir.path().join("notes.txt"), "not a face").unwrap();
        let mut r = recognizer();
        assert_eq!(r.load_known_faces(dir.path()), 2);
        assert_eq!(r.known_face_names(), vec!["adam", "zoe"]);
    }

    #[test]
    fn test_unreadable_image_is_skipped_with_warning() {
        let dir = tempfile::tempdir().unwrap();
        save_square(dir.path(), "good.png", [20, 220, 20]);
        fs::write(dir.path().join("broken.jpg"), b"garbage").unwrap();
        let mut r = recognizer();
        assert_eq!(r.load_known_faces(dir.path()), 1);
        assert!(r.warnings().iter().any(|w| w.contains("broken")));
    }

    #[test]
    fn test_image_without_face_is_skipped() {
        let dir = tempfile::tempdir().unwrap();
        save_square(dir.path(), "landscape.png", [20, 220, 20]);
        let mut r = FaceRecognizer::new(Box::new(HistogramFaceEncoder), Box::new(NoFaceDetector), None);
        assert_eq!(r.load_known_faces(dir.path()), 0);
        assert!(r.warnings().iter().any(|w| w.contains("no face found")));
    }

    #[test]
    fn test_reload_replaces_previous_set() {
        let first = tempfile::tempdir().unwrap();
        save_square(first.path(), "alice.png", [220, 20, 20]);
        let second = tempfile::tempdir().unwrap();
        save_square(second.path(), "bob.png", [20, 20, 220]);

        let mut r = recognizer();
        r.load_known_faces(first.path());
        r.load_known_faces(second.path());
        assert_eq!(r.known_face_names(), vec!["bob"]);
    }

    #[test]
    fn test_explicit_tolerance_overrides_encoder_default() {
        let r = FaceRecognizer::new(Box::new(HistogramFaceEncoder), Box::new(FullFrameFaceDetector), Some(0.3));
        assert!((r.tolerance() - 0.3).abs() < 1e-9);
        assert!((recognizer().tolerance() - 0.6).abs() < 1e-9);
    }
}
