pub mod face_detector_factory;
pub mod full_frame_detector;
pub mod nms;
pub mod onnx_blazeface_detector;
pub mod onnx_yolo_detector;
