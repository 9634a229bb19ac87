/// HSV histogram-based face encoder.
///
/// Embeds a face crop as its 2D Hue-Saturation colour distribution. No ML
/// model required, so recognition works out of the box; it distinguishes
/// appearance (skin tone, clothing, lighting) rather than identity.
use crate::recognition::domain::face_embedding::FaceEmbedding;
use crate::recognition::domain::face_encoder::FaceEncoder;
use crate::shared::frame::Frame;
use crate::shared::math::l2_normalize;
use crate::shared::region::FaceBox;

pub const DEFAULT_TOLERANCE: f64 = 0.6;

const HUE_BINS: usize = 32;
const SAT_BINS: usize = 32;

#[derive(Clone, Copy, Debug, Default)]
pub struct HistogramFaceEncoder;

impl FaceEncoder for HistogramFaceEncoder {
    fn encode(
        &mut self,
        frame: &Frame,
        face: &FaceBox,
    ) -> Result<Option<FaceEmbedding>, Box<dyn std::error::Error>> {
        let Some(crop) = frame.crop(face) else {
            return Ok(None);
        };
        let mut hist = compute_histogram(crop.data(), crop.channels() as usize);
        l2_normalize(&mut hist);
        Ok(Some(FaceEmbedding::new(hist)))
    }

    fn default_tolerance(&self) -> f64 {
        DEFAULT_TOLERANCE
    }
}

/// Pixel-count histogram over (hue, saturation) bins.
fn compute_histogram(data: &[u8], channels: usize) -> Vec<f32> {
    let mut hist = vec![0.0f32; HUE_BINS * SAT_BINS];
    if channels < 3 {
        return hist;
    }
    for px in data.chunks_exact(channels) {
        let r = px[0] as f64 / 255.0;
        let g = px[1] as f64 / 255.0;
        let b = px[2] as f64 / 255.0;
        let (h, s, _v) = rgb_to_hsv(r, g, b);

        let h_bin = ((h / 360.0) * HUE_BINS as f64).min(HUE_BINS as f64 - 1.0) as usize;
        let s_bin = (s * SAT_BINS as f64).min(SAT_BINS as f64 - 1.0) as usize;
        hist[h_bin * SAT_BINS + s_bin] += 1.0;
    }
    hist
}

fn rgb_to_hsv(r: f64, g: f64, b: f64) -> (f64, f64, f64) {
    let max = r.max(g).max(b);
    let min = r.min(g).min(b);
    let delta = max - min;

    let v = max;
    let s = if max > 0.0 { delta / max } else { 0.0 };

    let h = if delta == 0.0 {
        0.0
    } else if (max - r).abs() < f64::EPSILON {
        60.0 * (((g - b) / delta) % 6.0)
    } else if (max - g).abs() < f64::EPSILON {
        60.0 * ((b - r) / delta + 2.0)
    } else {
        60.0 * ((r - g) / delta + 4.0)
    };

    let h = if h < 0.0 { h + 360.0 } else { h };
    (h, s, v)
}
