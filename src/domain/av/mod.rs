//! Fixed-length slicing of the source media, audio and video side.

pub mod audio;
pub mod video;
