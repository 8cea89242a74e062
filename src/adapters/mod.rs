//! Adapters - Concrete implementations of the ports.

pub mod ffmpeg;
pub mod memory;
pub mod speech;

pub use ffmpeg::{FfmpegTool, SystemFfmpeg};
pub use memory::InMemoryVideoRepository;
pub use speech::{GoogleSpeechClient, HttpSpeechTransport};
