use std::path::Path;

use crate::shared::constants::IMAGE_EXTENSIONS;
use crate::shared::error::AnalysisError;
use crate::shared::frame::Frame;

/// Decodes a still image into an RGB [`Frame`] with index 0.
///
/// Reference portraits are small, so the pure-Rust `image` decoder is used
/// rather than spinning up an ffmpeg demuxer per file.
pub fn load_rgb_frame(path: &Path) -> Result<Frame, AnalysisError> {
    let rgb = image::open(path)
        .map_err(|e| AnalysisError::ImageDecode {
            path: path.to_path_buf(),
            source: e,
        })?
        .to_rgb8();
    let (width, height) = rgb.dimensions();
    Ok(Frame::new(rgb.into_raw(), width, height, 3, 0))
}

/// Whether the file extension is one of the supported image formats.
pub fn is_image(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| IMAGE_EXTENSIONS.contains(&ext.to_lowercase().as_str()))
        .unwrap_or(false)
}
