pub mod frame_source;
pub mod source_id;
pub mod stream_info;
