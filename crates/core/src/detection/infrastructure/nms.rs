use crate::shared::math::bbox_iou;
use crate::shared::region::FaceBox;

/// A scored box in source-frame pixel coordinates, before suppression.
#[derive(Clone, Debug, PartialEq)]
pub struct RawDetection {
    pub x1: f64,
    pub y1: f64,
    pub x2: f64,
    pub y2: f64,
    pub score: f64,
}

impl RawDetection {
    fn corners(&self) -> [f64; 4] {
        [self.x1, self.y1, self.x2, self.y2]
    }

    /// Clamps to a `width` x `height` frame.
    pub fn to_face_box(&self, width: u32, height: u32) -> FaceBox {
        FaceBox::from_corners(self.x1, self.y1, self.x2, self.y2, width, height)
    }
}

/// Greedy NMS: sort by score descending, suppress overlapping boxes.
pub fn nms(dets: &mut [RawDetection], iou_thresh: f64) -> Vec<RawDetection> {
    dets.sort_by(|a, b| {
        b.score
            .partial_cmp(&a.score)
            .unwrap_or(std::cmp::Ordering::Equal)
    });

    let mut keep = Vec::new();
    let mut suppressed = vec![false; dets.len()];

    for i in 0..dets.len() {
        if suppressed[i] {
            continue;
        }
        keep.push(dets[i].clone());
        for j in (i + 1)..dets.len() {
            if !suppressed[j] && bbox_iou(&dets[i].corners(), &dets[j].corners()) > iou_thresh {
                suppressed[j] = true;
            }
        }
    }
    keep
}

/// Clamped, non-degenerate face boxes for the surviving detections.
pub fn to_face_boxes(dets: &[RawDetection], width: u32, height: u32) -> Vec<FaceBox> {
    dets.iter()
        .map(|d| d.to_face_box(width, height))
        .filter(|b| !b.is_degenerate())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn det(x1: f64, y1: f64, x2: f64, y2: f64, score: f64) -> RawDetection {
        RawDetection {
            x1,
            y1,
            x2,
            y2,
            score,
        }
    }

    #[test]
    fn test_nms_suppresses_overlapping() {
        let mut dets = vec![det(0.0, 0.0, 100.0, 100.0, 0.9), det(5.0, 5.0, 105.0, 105.0, 0.8)];
        let kept = nms(&mut dets, 0.3);
        assert_eq!(kept.len(), 1);
        assert!((kept[0].score - 0.9).abs() < 1e-9);
    }

    #[test]
    fn test_nms_keeps_non_overlapping() {
        let mut dets = vec![det(0.0, 0.0, 50.0, 50.0, 0.9), det(200.0, 200.0, 250.0, 250.0, 0.8)];
        assert_eq!(nms(&mut dets, 0.3).len(), 2);
    }

    #[test]
    fn test_nms_higher_score_wins() {
        let mut dets = vec![det(0.0, 0.0, 100.0, 100.0, 0.5), det(2.0, 2.0, 102.0, 102.0, 0.9)];
        let kept = nms(&mut dets, 0.3);
        assert_eq!(kept.len(), 1);
        assert!((kept[0].score - 0.9).abs() < 1e-9);
    }

    #[test]
    fn test_nms_empty_input() {
        let mut dets: Vec<RawDetection> = Vec::new();
        assert!(nms(&mut dets, 0.3).is_empty());
    }

    #[test]
    fn test_to_face_boxes_clamps_and_drops_degenerate() {
        let dets = vec![
            det(-20.0, 10.0, 50.0, 300.0, 0.9),
            det(700.0, 10.0, 720.0, 40.0, 0.8),
        ];
        let boxes = to_face_boxes(&dets, 640, 240);
        assert_eq!(boxes, vec![FaceBox::new(10, 50, 240, 0)]);
    }
}
