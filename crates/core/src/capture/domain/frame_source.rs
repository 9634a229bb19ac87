use crate::capture::domain::source_id::SourceId;
use crate::capture::domain::stream_info::StreamInfo;
use crate::shared::error::AnalysisError;
use crate::shared::frame::Frame;

/// Owns one capture handle for its lifetime.
///
/// Reads are pull-based and synchronous. A failed grab closes the source
/// and releases the handle before `read` returns, so every later `read`
/// is a cheap `None`.
pub trait FrameSource: Send {
    /// Acquires the capture handle. Fails with
    /// [`AnalysisError::CaptureUnavailable`]; there is no retry.
    fn open(&mut self, source: &SourceId) -> Result<StreamInfo, AnalysisError>;

    /// Returns the next frame, or `None` once the stream has ended or failed.
    fn read(&mut self) -> Option<Frame>;

    /// Releases the handle. Idempotent.
    fn close(&mut self);

    /// Whether the handle is currently held. Long-running loops check this
    /// before each `read`, since devices can disappear between calls.
    fn is_open(&self) -> bool;
}
