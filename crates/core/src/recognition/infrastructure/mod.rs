pub mod arcface_encoder;
pub mod face_encoder_factory;
pub mod histogram_face_encoder;
