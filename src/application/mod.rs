//! Application - Services wiring domain logic to the ports.

pub mod pipeline;

pub use pipeline::{PipelineError, PipelineService, PipelineSettings, Stage};
