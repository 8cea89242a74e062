//! Domain - Pure pipeline logic: records, alignment, subtitles, segmenting.

pub mod av;
pub mod subtitles;
pub mod transcript;
pub mod video;
