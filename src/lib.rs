//! Legenda - Video Subtitling Pipeline
//!
//! Takes an uploaded video, transcribes its audio, cuts the video into
//! fixed-length segments and burns time-aligned subtitles into each one.
//!
//! Hexagonal Architecture:
//! - domain/: Pure pipeline logic (records, alignment, subtitles, segmenting)
//! - ports/: Trait definitions (media tool, speech service, record store)
//! - adapters/: Concrete implementations (ffmpeg CLI, Google speech, memory)
//! - application/: Pipeline orchestration
//! - config: Environment configuration

pub mod adapters;
pub mod application;
pub mod config;
pub mod domain;
pub mod ports;

// Re-exports for convenience
pub use application::{PipelineError, PipelineService, PipelineSettings};
pub use config::Config;
pub use domain::video::{Status, Video};
