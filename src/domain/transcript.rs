//! Word-rate alignment of a transcript onto playback time.
//!
//! The speech service gives back plain text with no word timestamps, so the
//! mapping from word index to time is approximated with a constant
//! words-per-second rate over the whole playback window. Uneven speech pacing
//! shifts words across window boundaries; that is accepted here.

/// A transcript spread over a playback window at a constant word rate.
#[derive(Debug, Clone)]
pub struct TranscriptMap {
    words: Vec<String>,
    words_per_second: f64,
}

impl TranscriptMap {
    /// Build the map for a transcript covering `total_duration` seconds.
    pub fn new(text: &str, total_duration: f64) -> Self {
        let words: Vec<String> = text.split_whitespace().map(str::to_owned).collect();
        let words_per_second = if total_duration > 0.0 {
            words.len() as f64 / total_duration
        } else {
            0.0
        };
        Self {
            words,
            words_per_second,
        }
    }

    pub fn word_count(&self) -> usize {
        self.words.len()
    }

    pub fn words_per_second(&self) -> f64 {
        self.words_per_second
    }

    /// The words falling inside `[start_seconds, end_seconds)`, joined with
    /// single spaces. Empty when the window maps to no words.
    pub fn slice_window(&self, start_seconds: f64, end_seconds: f64) -> String {
        let from = ((start_seconds * self.words_per_second).floor() as usize).min(self.words.len());
        let to = ((end_seconds * self.words_per_second).floor() as usize).min(self.words.len());
        self.words[from..to.max(from)].join(" ")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn splits_words_evenly_across_windows() {
        // 10 words over 10 seconds: one word per second.
        let map = TranscriptMap::new("a b c d e f g h i j", 10.0);
        assert_eq!(map.word_count(), 10);
        assert_eq!(map.slice_window(0.0, 5.0), "a b c d e");
        assert_eq!(map.slice_window(5.0, 10.0), "f g h i j");
    }

    #[test]
    fn window_past_end_is_clamped() {
        let map = TranscriptMap::new("one two three", 3.0);
        assert_eq!(map.slice_window(2.0, 10.0), "three");
        assert_eq!(map.slice_window(5.0, 10.0), "");
    }

    #[test]
    fn empty_transcript_yields_empty_slices() {
        let map = TranscriptMap::new("", 60.0);
        assert_eq!(map.word_count(), 0);
        assert_eq!(map.slice_window(0.0, 60.0), "");
    }

    #[test]
    fn zero_duration_yields_no_rate() {
        let map = TranscriptMap::new("some words", 0.0);
        assert_eq!(map.words_per_second(), 0.0);
        assert_eq!(map.slice_window(0.0, 10.0), "");
    }

    #[test]
    fn repeated_whitespace_is_collapsed() {
        // Gaps from empty transcription chunks leave doubled spaces in the
        // concatenated transcript; they must not create phantom words.
        let map = TranscriptMap::new("hello   world", 2.0);
        assert_eq!(map.word_count(), 2);
        assert_eq!(map.slice_window(0.0, 2.0), "hello world");
    }
}
