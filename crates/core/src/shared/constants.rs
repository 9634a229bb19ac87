use crate::shared::model_resolver::ModelSpec;

/// Slow, high-recall face detector.
pub const YOLO_FACE_MODEL: ModelSpec = ModelSpec {
    file_name: "yolo11n-pose_widerface.onnx",
    url: Some(
        "https://github.com/neutrinographics/faceguard/releases/download/v0.1.0/yolo11n-pose_widerface.onnx",
    ),
};

/// Fast short-range face detector. Must be placed in the configured model
/// directory or the cache; there is no download source, so sessions fall
/// back to [`YOLO_FACE_MODEL`] when it is missing.
pub const BLAZEFACE_MODEL: ModelSpec = ModelSpec {
    file_name: "blazeface_short_range.onnx",
    url: None,
};

pub const ARCFACE_MODEL: ModelSpec = ModelSpec {
    file_name: "w600k_r50.onnx",
    url: Some("https://github.com/neutrinographics/faceguard/releases/download/v0.1.0/w600k_r50.onnx"),
};

pub const IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "bmp", "tiff", "tif", "webp"];

/// Label assigned to faces that match no known identity.
pub const UNKNOWN_LABEL: &str = "Unknown";

/// Motion regions at or below this many pixels are treated as noise.
pub const DEFAULT_MIN_MOTION_AREA: usize = 500;
