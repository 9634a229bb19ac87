use crate::motion::domain::mask::{Mask, BACKGROUND, FOREGROUND, SHADOW};
use crate::motion::domain::motion_detector::BackgroundModel;
use crate::shared::frame::Frame;

/// Stored samples per pixel.
pub const KNN_SAMPLES: usize = 7;
/// Samples that must lie within the distance threshold for background.
const KNN_MATCHES: usize = 2;
const SHADOW_TAU: f32 = 0.5;

/// Non-parametric background model keeping recent samples per pixel.
///
/// A pixel is background when at least two of its stored samples lie within
/// `dist2_threshold` (squared RGB distance). Samples are refreshed in a ring,
/// one slot every `history / KNN_SAMPLES` frames, so the buffer spans roughly
/// `history` frames.
pub struct KnnBackgroundModel {
    dist2_threshold: f32,
    detect_shadows: bool,
    update_interval: usize,
    width: u32,
    height: u32,
    channels: usize,
    /// `pixels * KNN_SAMPLES * channels`, slot-major within each pixel.
    samples: Vec<u8>,
    next_slot: usize,
    frames_since_update: usize,
}

impl KnnBackgroundModel {
    pub fn new(history: usize, dist2_threshold: f32, detect_shadows: bool) -> Self {
        Self {
            dist2_threshold,
            detect_shadows,
            update_interval: (history / KNN_SAMPLES).max(1),
            width: 0,
            height: 0,
            channels: 0,
            samples: Vec::new(),
            next_slot: 0,
            frames_since_update: 0,
        }
    }

    fn seed(&mut self, frame: &Frame) {
        self.width = frame.width();
        self.height = frame.height();
        self.channels = frame.channels() as usize;
        let c = self.channels;
        let data = frame.data();
        let pixels = (self.width * self.height) as usize;
        self.samples = Vec::with_capacity(pixels * KNN_SAMPLES * c);
        for i in 0..pixels {
            for _ in 0..KNN_SAMPLES {
                self.samples.extend_from_slice(&data[i * c..(i + 1) * c]);
            }
        }
        self.next_slot = 0;
        self.frames_since_update = 0;
    }

    fn matches_geometry(&self, frame: &Frame) -> bool {
        !self.samples.is_empty()
            && frame.width() == self.width
            && frame.height() == self.height
            && frame.channels() as usize == self.channels
    }

    fn pixel_samples(&self, i: usize) -> impl Iterator<Item = &[u8]> {
        let c = self.channels;
        let start = i * KNN_SAMPLES * c;
        self.samples[start..start + KNN_SAMPLES * c].chunks_exact(c)
    }

    fn classify(&self, i: usize, pixel: &[u8]) -> u8 {
        let close = self
            .pixel_samples(i)
            .filter(|s| squared_distance(pixel, s) < self.dist2_threshold)
            .take(KNN_MATCHES)
            .count();
        if close >= KNN_MATCHES {
            return BACKGROUND;
        }
        if self.detect_shadows {
            let shadowed = self
                .pixel_samples(i)
                .filter(|s| self.is_shadow_of(pixel, s))
                .take(KNN_MATCHES)
                .count();
            if shadowed >= KNN_MATCHES {
                return SHADOW;
            }
        }
        FOREGROUND
    }

    fn is_shadow_of(&self, pixel: &[u8], sample: &[u8]) -> bool {
        let (mut dot, mut norm2) = (0.0f32, 0.0f32);
        for (&p, &s) in pixel.iter().zip(sample) {
            dot += p as f32 * s as f32;
            norm2 += s as f32 * s as f32;
        }
        if norm2 <= f32::EPSILON {
            return false;
        }
        let a = dot / norm2;
        if !(SHADOW_TAU..1.0).contains(&a) {
            return false;
        }
        let dist2a: f32 = pixel
            .iter()
            .zip(sample)
            .map(|(&p, &s)| {
                let d = p as f32 - a * s as f32;
                d * d
            })
            .sum();
        dist2a < self.dist2_threshold * a * a
    }

    fn store(&mut self, frame: &Frame) {
        let c = self.channels;
        let data = frame.data();
        let pixels = (self.width * self.height) as usize;
        for i in 0..pixels {
            let dst = (i * KNN_SAMPLES + self.next_slot) * c;
            self.samples[dst..dst + c].copy_from_slice(&data[i * c..(i + 1) * c]);
        }
        self.next_slot = (self.next_slot + 1) % KNN_SAMPLES;
    }
}

fn squared_distance(a: &[u8], b: &[u8]) -> f32 {
    a.iter()
        .zip(b)
        .map(|(&x, &y)| {
            let d = x as f32 - y as f32;
            d * d
        })
        .sum()
}

impl BackgroundModel for KnnBackgroundModel {
    fn apply(&mut self, frame: &Frame) -> Option<Mask> {
        if !self.matches_geometry(frame) {
            self.seed(frame);
            return None;
        }

        let c = self.channels;
        let data = frame.data();
        let mut mask = Mask::blank(self.width, self.height);
        for (i, out) in mask.data.iter_mut().enumerate() {
            *out = self.classify(i, &data[i * c..(i + 1) * c]);
        }

        self.frames_since_update += 1;
        if self.frames_since_update >= self.update_interval {
            self.store(frame);
            self.frames_since_update = 0;
        }

        Some(mask)
    }
}
