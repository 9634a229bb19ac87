pub mod connected_regions;
pub mod mask;
pub mod motion_algorithm;
pub mod motion_detector;
