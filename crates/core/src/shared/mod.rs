pub mod constants;
pub mod error;
pub mod frame;
pub mod math;
pub mod model_resolver;
pub mod onnx;
pub mod region;
