/// Properties of an opened capture stream.
#[derive(Clone, Debug, PartialEq)]
pub struct StreamInfo {
    pub width: u32,
    pub height: u32,
    /// Nominal frame rate; 0.0 when the source does not report one.
    pub fps: f64,
    /// Human-readable name of the source, used as the report label.
    pub label: String,
}
