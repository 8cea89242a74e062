//! Ports - Trait definitions consumed by the application layer.

pub mod media;
pub mod repository;
pub mod speech;
