pub mod encoder_kind;
pub mod face_embedding;
pub mod face_encoder;
pub mod known_faces;
