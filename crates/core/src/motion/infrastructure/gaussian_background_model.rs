use crate::motion::domain::mask::{Mask, BACKGROUND, FOREGROUND, SHADOW};
use crate::motion::domain::motion_detector::BackgroundModel;
use crate::shared::frame::Frame;

const VAR_INIT: f32 = 15.0;
const VAR_MIN: f32 = 4.0;
const VAR_MAX: f32 = 75.0;
/// Lower bound of the brightness ratio for a pixel to count as shadow.
const SHADOW_TAU: f32 = 0.5;

/// MOG2-style background model with a single running Gaussian per pixel.
///
/// Each pixel keeps a per-channel mean and one isotropic variance. A pixel
/// is foreground when its squared Mahalanobis distance from the mean
/// exceeds `var_threshold`. The learning rate is `1 / min(frames, history)`,
/// so early frames converge fast and later ones adapt over `history` frames.
pub struct GaussianBackgroundModel {
    history: usize,
    var_threshold: f32,
    detect_shadows: bool,
    width: u32,
    height: u32,
    channels: usize,
    mean: Vec<f32>,
    variance: Vec<f32>,
    frames_seen: usize,
}

impl GaussianBackgroundModel {
    pub fn new(history: usize, var_threshold: f32, detect_shadows: bool) -> Self {
        Self {
            history: history.max(1),
            var_threshold,
            detect_shadows,
            width: 0,
            height: 0,
            channels: 0,
            mean: Vec::new(),
            variance: Vec::new(),
            frames_seen: 0,
        }
    }

    fn seed(&mut self, frame: &Frame) {
        self.width = frame.width();
        self.height = frame.height();
        self.channels = frame.channels() as usize;
        self.mean = frame.data().iter().map(|&v| v as f32).collect();
        self.variance = vec![VAR_INIT; (self.width * self.height) as usize];
        self.frames_seen = 1;
    }

    fn matches_geometry(&self, frame: &Frame) -> bool {
        self.frames_seen > 0
            && frame.width() == self.width
            && frame.height() == self.height
            && frame.channels() as usize == self.channels
    }

    /// Darker-but-same-chroma test against the mean of one pixel.
    fn is_shadow(&self, pixel: &[u8], mean: &[f32], var: f32) -> bool {
        let (mut dot, mut norm2) = (0.0f32, 0.0f32);
        for (&p, &m) in pixel.iter().zip(mean) {
            dot += p as f32 * m;
            norm2 += m * m;
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
            .zip(mean)
            .map(|(&p, &m)| {
                let d = p as f32 - a * m;
                d * d
            })
            .sum();
        dist2a < self.var_threshold * var * a * a
    }
}

impl BackgroundModel for GaussianBackgroundModel {
    fn apply(&mut self, frame: &Frame) -> Option<Mask> {
        if !self.matches_geometry(frame) {
            self.seed(frame);
            return None;
        }

        self.frames_seen += 1;
        let alpha = 1.0 / self.frames_seen.min(self.history) as f32;
        let c = self.channels;
        let data = frame.data();
        let mut mask = Mask::blank(self.width, self.height);

        for (i, out) in mask.data.iter_mut().enumerate() {
            let pixel = &data[i * c..(i + 1) * c];
            let var = self.variance[i];

            let mut dist2 = 0.0f32;
            for (k, &p) in pixel.iter().enumerate() {
                let d = p as f32 - self.mean[i * c + k];
                dist2 += d * d;
            }

            *out = if dist2 <= self.var_threshold * var {
                BACKGROUND
            } else if self.detect_shadows && self.is_shadow(pixel, &self.mean[i * c..(i + 1) * c], var)
            {
                SHADOW
            } else {
                FOREGROUND
            };

            for (k, &p) in pixel.iter().enumerate() {
                let m = &mut self.mean[i * c + k];
                *m += alpha * (p as f32 - *m);
            }
            let per_channel = dist2 / c as f32;
            self.variance[i] = (var + alpha * (per_channel - var)).clamp(VAR_MIN, VAR_MAX);
        }

        Some(mask)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn solid(width: u32, height: u32, rgb: [u8; 3]) -> Frame {
        let data = rgb.repeat((width * height) as usize);
        Frame::new(data, width, height, 3, 0)
    }

    fn with_rect(base: &Frame, x: u32, y: u32, w: u32, h: u32, rgb: [u8; 3]) -> Frame {
        let mut data = base.data().to_vec();
        for row in y..y + h {
            for col in x..x + w {
                let idx = ((row * base.width() + col) * 3) as usize;
                data[idx..idx + 3].copy_from_slice(&rgb);
            }
        }
        Frame::new(data, base.width(), base.height(), 3, base.index() + 1)
    }

    #[test]
    fn test_first_frame_only_seeds() {
        let mut model = GaussianBackgroundModel::new(500, 16.0, true);
        assert!(model.apply(&solid(16, 16, [40, 40, 40])).is_none());
    }

    #[test]
    fn test_static_scene_is_background() {
        let mut model = GaussianBackgroundModel::new(500, 16.0, true);
        let frame = solid(16, 16, [40, 40, 40]);
        model.apply(&frame);
        let mask = model.apply(&frame).unwrap();
        assert_eq!(mask.count(FOREGROUND), 0);
        assert_eq!(mask.count(SHADOW), 0);
    }

    #[test]
    fn test_bright_rectangle_is_foreground() {
        let mut model = GaussianBackgroundModel::new(500, 16.0, true);
        let bg = solid(32, 32, [20, 20, 20]);
        model.apply(&bg);
        let mask = model.apply(&with_rect(&bg, 4, 4, 10, 10, [250, 250, 250])).unwrap();
        assert_eq!(mask.count(FOREGROUND), 100);
    }

    #[test]
    fn test_darkened_patch_is_shadow_when_enabled() {
        let bg = solid(32, 32, [200, 160, 120]);
        let shadowed = with_rect(&bg, 0, 0, 8, 8, [140, 112, 84]);

        let mut model = GaussianBackgroundModel::new(500, 16.0, true);
        model.apply(&bg);
        let mask = model.apply(&shadowed).unwrap();
        assert_eq!(mask.count(SHADOW), 64);
        assert_eq!(mask.count(FOREGROUND), 0);

        let mut model = GaussianBackgroundModel::new(500, 16.0, false);
        model.apply(&bg);
        let mask = model.apply(&shadowed).unwrap();
        assert_eq!(mask.count(SHADOW), 0);
        assert_eq!(mask.count(FOREGROUND), 64);
    }

    #[test]
    fn test_persistent_change_is_absorbed() {
        let mut model = GaussianBackgroundModel::new(5, 16.0, false);
        let bg = solid(8, 8, [10, 10, 10]);
        let changed = solid(8, 8, [200, 200, 200]);
        model.apply(&bg);
        let mut last = None;
        for _ in 0..40 {
            last = model.apply(&changed);
        }
        assert_eq!(last.unwrap().count(FOREGROUND), 0);
    }

    #[test]
    fn test_size_change_reseeds() {
        let mut model = GaussianBackgroundModel::new(500, 16.0, true);
        model.apply(&solid(8, 8, [0, 0, 0]));
        assert!(model.apply(&solid(10, 10, [0, 0, 0])).is_none());
        assert!(model.apply(&solid(10, 10, [0, 0, 0])).is_some());
    }
}
