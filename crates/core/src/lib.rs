pub mod capture;
pub mod config;
pub mod detection;
pub mod motion;
pub mod pipeline;
pub mod recognition;
pub mod report;
pub mod shared;
