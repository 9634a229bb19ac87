use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

/// Selects what a [`FrameSource`](super::frame_source::FrameSource) opens:
/// a numbered capture device or a path/URL understood by the demuxer.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SourceId {
    Device(u32),
    Path(PathBuf),
}

impl FromStr for SourceId {
    type Err = std::convert::Infallible;

    /// All-digit strings select a device index; anything else is a path.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if !trimmed.is_empty() && trimmed.chars().all(|c| c.is_ascii_digit()) {
            if let Ok(index) = trimmed.parse::<u32>() {
                return Ok(SourceId::Device(index));
            }
        }
        Ok(SourceId::Path(PathBuf::from(s)))
    }
}

impl fmt::Display for SourceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SourceId::Device(index) => write!(f, "device {index}"),
            SourceId::Path(path) => write!(f, "{}", path.display()),
        }
    }
}

impl From<u32> for SourceId {
    fn from(index: u32) -> Self {
        SourceId::Device(index)
    }
}
