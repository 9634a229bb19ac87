/// YOLO face detector using ONNX Runtime via `ort`.
///
/// The "accurate" model: letterboxed 640x640 inference with NMS. Slower than
/// BlazeFace but with much better recall on small and angled faces.
use std::path::Path;

use crate::detection::domain::face_detector::FaceDetector;
use crate::shared::error::AnalysisError;
use crate::shared::frame::Frame;
use crate::shared::onnx::load_session;
use crate::shared::region::FaceBox;

use super::nms::{nms, to_face_boxes, RawDetection};

/// Fallback input resolution when the model doesn't specify dimensions.
const DEFAULT_INPUT_SIZE: u32 = 640;

/// NMS IoU threshold.
const NMS_IOU_THRESH: f64 = 0.45;

/// Letterbox geometry needed to map model-space boxes back to the frame.
#[derive(Clone, Copy, Debug, PartialEq)]
struct Letterbox {
    scale: f64,
    pad_x: u32,
    pad_y: u32,
}

pub struct OnnxYoloDetector {
    session: ort::session::Session,
    confidence: f64,
    input_size: u32,
}

impl OnnxYoloDetector {
    /// Loads the model. The input resolution is read from its NCHW input
    /// shape, falling back to 640 when the shape is dynamic.
    pub fn new(model_path: &Path, confidence: f64) -> Result<Self, AnalysisError> {
        let session = load_session(model_path)?;
        let input_size = session
            .inputs()
            .first()
            .and_then(|input| match input.dtype() {
                ort::value::ValueType::Tensor { shape, .. } if shape.len() >= 4 && shape[2] > 0 => {
                    Some(shape[2] as u32)
                }
                _ => None,
            })
            .unwrap_or(DEFAULT_INPUT_SIZE);
        log::debug!("YOLO face model input size {input_size}");

        Ok(Self {
            session,
            confidence,
            input_size,
        })
    }
}

impl FaceDetector for OnnxYoloDetector {
    fn detect(&mut self, frame: &Frame) -> Result<Vec<FaceBox>, Box<dyn std::error::Error>> {
        if frame.is_empty() {
            return Ok(Vec::new());
        }

        let (input_tensor, geometry) = letterbox(frame, self.input_size);
        let input_value = ort::value::Tensor::from_array(input_tensor)?;
        let outputs = self.session.run(ort::inputs![input_value])?;
        if outputs.len() == 0 {
            return Err("YOLO model produced no outputs".into());
        }
        let tensor = outputs[0].try_extract_array::<f32>()?;
        let shape = tensor.shape().to_vec();
        let data = tensor.as_slice().ok_or("Cannot get tensor slice")?;

        let mut raw = decode_output(data, &shape, self.confidence, geometry)?;
        let kept = nms(&mut raw, NMS_IOU_THRESH);
        Ok(to_face_boxes(&kept, frame.width(), frame.height()))
    }
}

/// Letterbox-resize a frame to `target_size` x `target_size` NCHW float32,
/// padding with YOLO's 114 gray.
fn letterbox(frame: &Frame, target_size: u32) -> (ndarray::Array4<f32>, Letterbox) {
    let fw = frame.width() as f64;
    let fh = frame.height() as f64;
    let target = target_size as f64;

    let scale = (target / fw).min(target / fh);
    let new_w = ((fw * scale).round() as u32).min(target_size);
    let new_h = ((fh * scale).round() as u32).min(target_size);
    let pad_x = (target_size - new_w) / 2;
    let pad_y = (target_size - new_h) / 2;

    let gray = 114.0f32 / 255.0;
    let mut tensor =
        ndarray::Array4::<f32>::from_elem((1, 3, target_size as usize, target_size as usize), gray);

    let src = frame.as_ndarray();
    let src_h = frame.height() as usize;
    let src_w = frame.width() as usize;
    let channels = frame.channels() as usize;

    for y in 0..new_h as usize {
        let src_y = ((y as f64 / scale) as usize).min(src_h - 1);
        for x in 0..new_w as usize {
            let src_x = ((x as f64 / scale) as usize).min(src_w - 1);
            let ty = pad_y as usize + y;
            let tx = pad_x as usize + x;
            for c in 0..3 {
                tensor[[0, c, ty, tx]] = src[[src_y, src_x, c.min(channels - 1)]] as f32 / 255.0;
            }
        }
    }

    (
        tensor,
        Letterbox {
            scale,
            pad_x,
            pad_y,
        },
    )
}

/// Parses `[1, features, detections]` (or `[1, detections, features]`)
/// output rows of `[cx, cy, w, h, conf, ...]` into frame-space boxes.
fn decode_output(
    data: &[f32],
    shape: &[usize],
    confidence: f64,
    geometry: Letterbox,
) -> Result<Vec<RawDetection>, String> {
    if shape.len() != 3 {
        return Err(format!("Unexpected YOLO output shape: {shape:?}"));
    }
    let transposed = shape[1] < shape[2];
    let (num_dets, num_feats) = if transposed {
        (shape[2], shape[1])
    } else {
        (shape[1], shape[2])
    };
    if num_feats < 5 || data.len() < num_dets * num_feats {
        return Err(format!("YOLO output too small for shape {shape:?}"));
    }

    let value = |det: usize, feat: usize| -> f64 {
        let idx = if transposed {
            feat * num_dets + det
        } else {
            det * num_feats + feat
        };
        data[idx] as f64
    };

    let Letterbox {
        scale,
        pad_x,
        pad_y,
    } = geometry;
    let mut dets = Vec::new();
    for i in 0..num_dets {
        let conf = value(i, 4);
        if conf < confidence {
            continue;
        }
        let (cx, cy, w, h) = (value(i, 0), value(i, 1), value(i, 2), value(i, 3));
        dets.push(RawDetection {
            x1: (cx - w / 2.0 - pad_x as f64) / scale,
            y1: (cy - h / 2.0 - pad_y as f64) / scale,
            x2: (cx + w / 2.0 - pad_x as f64) / scale,
            y2: (cy + h / 2.0 - pad_y as f64) / scale,
            score: conf,
        });
    }
    Ok(dets)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_letterbox_preserves_aspect_ratio() {
        // 200x100 -> scale 3.2, new 640x320, pad_y 160
        let frame = Frame::new(vec![128u8; 200 * 100 * 3], 200, 100, 3, 0);
        let (tensor, geometry) = letterbox(&frame, 640);
        assert_eq!(tensor.shape(), &[1, 3, 640, 640]);
        assert_relative_eq!(geometry.scale, 3.2, epsilon = 0.01);
        assert_eq!(geometry.pad_x, 0);
        assert_eq!(geometry.pad_y, 160);
    }

    #[test]
    fn test_letterbox_values_normalized() {
        let frame = Frame::new(vec![255u8; 100 * 50 * 3], 100, 50, 3, 0);
        let (tensor, geometry) = letterbox(&frame, 640);
        let y = geometry.pad_y as usize + 1;
        assert_relative_eq!(tensor[[0, 0, y, 1]], 1.0, epsilon = 0.01);
        assert_relative_eq!(tensor[[0, 0, 0, 0]], 114.0 / 255.0, epsilon = 0.01);
    }

    #[test]
    fn test_decode_row_major_maps_back_through_letterbox() {
        let geometry = Letterbox {
            scale: 2.0,
            pad_x: 0,
            pad_y: 40,
        };
        // 6 detections x 5 features; only the first is confident.
        let mut data = vec![
            100.0, 140.0, 40.0, 60.0, 0.9, //
            10.0, 10.0, 5.0, 5.0, 0.1,
        ];
        data.resize(6 * 5, 0.0);
        let dets = decode_output(&data, &[1, 6, 5], 0.5, geometry).unwrap();
        assert_eq!(dets.len(), 1);
        assert_relative_eq!(dets[0].x1, 40.0);
        assert_relative_eq!(dets[0].x2, 60.0);
        assert_relative_eq!(dets[0].y1, 35.0);
        assert_relative_eq!(dets[0].y2, 65.0);
        assert_relative_eq!(dets[0].score, 0.9, epsilon = 1e-6);
    }

    #[test]
    fn test_decode_transposed_layout() {
        let geometry = Letterbox {
            scale: 1.0,
            pad_x: 0,
            pad_y: 0,
        };
        // [1, 5 features, 8 detections]; only detection 3 is confident.
        let mut data = vec![0.0f32; 5 * 8];
        let set = |data: &mut Vec<f32>, feat: usize, det: usize, v: f32| data[feat * 8 + det] = v;
        set(&mut data, 0, 3, 50.0);
        set(&mut data, 1, 3, 50.0);
        set(&mut data, 2, 3, 20.0);
        set(&mut data, 3, 3, 20.0);
        set(&mut data, 4, 3, 0.8);
        let dets = decode_output(&data, &[1, 5, 8], 0.25, geometry).unwrap();
        assert_eq!(dets.len(), 1);
        assert_relative_eq!(dets[0].x1, 40.0);
        assert_relative_eq!(dets[0].y2, 60.0);
    }

    #[test]
    fn test_decode_rejects_bad_shape() {
        let geometry = Letterbox {
            scale: 1.0,
            pad_x: 0,
            pad_y: 0,
        };
        assert!(decode_output(&[0.0; 4], &[4], 0.5, geometry).is_err());
        assert!(decode_output(&[0.0; 12], &[1, 3, 4], 0.5, geometry).is_err());
    }
}
