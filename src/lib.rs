pub mod analysis;
pub mod config;
pub mod gemini;
pub mod images;
pub mod pipeline;
pub mod session;
