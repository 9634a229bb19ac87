pub mod background_subtraction_detector;
pub mod frame_difference_detector;
pub mod gaussian_background_model;
mod image_ops;
pub mod knn_background_model;
pub mod motion_detector_factory;
