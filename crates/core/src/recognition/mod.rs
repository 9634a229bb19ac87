pub mod domain;
pub mod face_recognizer;
pub mod infrastructure;
