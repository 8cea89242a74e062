//! Subtitle timing: allocate transcript words onto timed caption cues and
//! emit them as an SRT track.

use std::collections::VecDeque;
use std::path::Path;

/// Seconds of playback covered by one cue (before clamping at the end).
pub const CUE_WINDOW_SECONDS: f64 = 5.0;
/// Maximum characters of text per cue.
pub const MAX_CUE_CHARS: usize = 100;

/// One timed caption card.
#[derive(Debug, Clone, PartialEq)]
pub struct SubtitleCue {
    pub sequence: usize,
    pub start: f64,
    pub end: f64,
    pub text: String,
}

/// An ordered SRT subtitle track.
#[derive(Debug, Clone, PartialEq)]
pub struct SubtitleTrack {
    pub cues: Vec<SubtitleCue>,
}

impl SubtitleTrack {
    /// Distribute `text` over `total_duration` seconds of playback.
    ///
    /// Words are consumed at a constant rate (`word count / total_duration`)
    /// in fixed windows of [`CUE_WINDOW_SECONDS`], each cue capped at
    /// [`MAX_CUE_CHARS`]. A window whose text comes out empty is skipped but
    /// still advances time. Returns `None` when no cue is produced, letting
    /// the caller pass the video through without a burn step.
    pub fn build(text: &str, total_duration: f64) -> Option<SubtitleTrack> {
        if total_duration <= 0.0 {
            return None;
        }

        let mut words: VecDeque<&str> = text.split_whitespace().collect();
        let words_per_second = words.len() as f64 / total_duration;

        let mut cues = Vec::new();
        let mut start = 0.0;
        let mut sequence = 1;

        while !words.is_empty() && start < total_duration {
            let end = (start + CUE_WINDOW_SECONDS).min(total_duration);
            let mut quota = ((end - start) * words_per_second).floor() as usize;
            let mut cue_text = String::new();

            while quota > 0 {
                let Some(word) = words.front() else { break };
                let needed = if cue_text.is_empty() {
                    word.len()
                } else {
                    word.len() + 1
                };
                if cue_text.len() + needed > MAX_CUE_CHARS {
                    break;
                }
                if !cue_text.is_empty() {
                    cue_text.push(' ');
                }
                cue_text.push_str(word);
                words.pop_front();
                quota -= 1;
            }

            if !cue_text.is_empty() {
                cues.push(SubtitleCue {
                    sequence,
                    start,
                    end,
                    text: cue_text,
                });
                sequence += 1;
            }

            start = end;
        }

        if cues.is_empty() {
            None
        } else {
            Some(SubtitleTrack { cues })
        }
    }

    /// Render the track in SRT syntax.
    pub fn to_srt(&self) -> String {
        let mut out = String::new();
        for cue in &self.cues {
            out.push_str(&format!(
                "{}\n{} --> {}\n{}\n\n",
                cue.sequence,
                format_timestamp(cue.start),
                format_timestamp(cue.end),
                cue.text
            ));
        }
        out
    }

    pub async fn write_to(&self, path: &Path) -> Result<(), std::io::Error> {
        tokio::fs::write(path, self.to_srt()).await
    }
}

/// SRT timestamp: `HH:MM:SS,mmm`.
pub fn format_timestamp(seconds: f64) -> String {
    let whole = seconds.floor() as u64;
    let millis = ((seconds - seconds.floor()) * 1000.0).floor() as u64;
    format!(
        "{:02}:{:02}:{:02},{:03}",
        whole / 3600,
        (whole % 3600) / 60,
        whole % 60,
        millis
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_transcript_produces_no_track() {
        assert_eq!(SubtitleTrack::build("", 60.0), None);
        assert_eq!(SubtitleTrack::build("   ", 60.0), None);
    }

    #[test]
    fn zero_duration_produces_no_track() {
        assert_eq!(SubtitleTrack::build("some words", 0.0), None);
    }

    #[test]
    fn cues_cover_five_second_windows() {
        // 20 words over 20 seconds: 1 word/s, 5 words per window.
        let text = (0..20).map(|i| format!("w{}", i)).collect::<Vec<_>>().join(" ");
        let track = SubtitleTrack::build(&text, 20.0).unwrap();
        assert_eq!(track.cues.len(), 4);
        assert_eq!(track.cues[0].start, 0.0);
        assert_eq!(track.cues[0].end, 5.0);
        assert_eq!(track.cues[0].text, "w0 w1 w2 w3 w4");
        assert_eq!(track.cues[3].end, 20.0);
        assert_eq!(track.cues[3].text, "w15 w16 w17 w18 w19");
    }

    #[test]
    fn last_window_is_clamped_to_duration() {
        let track = SubtitleTrack::build("a b c", 3.0).unwrap();
        assert_eq!(track.cues.len(), 1);
        assert_eq!(track.cues[0].end, 3.0);
    }

    #[test]
    fn cue_text_never_exceeds_character_budget() {
        let long_words = vec!["palavradecomprimentoexagerado"; 40].join(" ");
        let track = SubtitleTrack::build(&long_words, 10.0).unwrap();
        for cue in &track.cues {
            assert!(cue.text.len() <= MAX_CUE_CHARS, "cue too long: {:?}", cue);
        }
    }

    #[test]
    fn no_cue_has_empty_text() {
        // One word over a long duration: most windows get a zero quota.
        let track = SubtitleTrack::build("oi", 1.0).unwrap();
        for cue in &track.cues {
            assert!(!cue.text.is_empty());
        }
    }

    #[test]
    fn skipped_window_still_advances_time() {
        // 2 words over 20 seconds: 0.1 word/s, quota 0 for every 5s window
        // until rounding lets one through -- here quota is always 0, so no
        // track is produced at all.
        assert_eq!(SubtitleTrack::build("a b", 20.0), None);
    }

    #[test]
    fn sequence_numbers_start_at_one_and_increase() {
        let text = (0..30).map(|i| format!("w{}", i)).collect::<Vec<_>>().join(" ");
        let track = SubtitleTrack::build(&text, 30.0).unwrap();
        let sequences: Vec<usize> = track.cues.iter().map(|c| c.sequence).collect();
        assert_eq!(sequences, (1..=track.cues.len()).collect::<Vec<_>>());
    }

    #[test]
    fn timestamp_formatting() {
        assert_eq!(format_timestamp(0.0), "00:00:00,000");
        assert_eq!(format_timestamp(5.0), "00:00:05,000");
        assert_eq!(format_timestamp(65.25), "00:01:05,250");
        assert_eq!(format_timestamp(3661.5), "01:01:01,500");
    }

    #[test]
    fn srt_rendering_uses_arrow_separator() {
        let track = SubtitleTrack::build("ola mundo legendado agora", 4.0).unwrap();
        let srt = track.to_srt();
        assert!(srt.starts_with("1\n00:00:00,000 --> 00:00:04,000\n"));
        assert!(srt.ends_with("\n\n"));
    }

    #[tokio::test]
    async fn track_writes_to_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("track.srt");
        let track = SubtitleTrack::build("um dois tres quatro", 4.0).unwrap();
        track.write_to(&path).await.unwrap();
        let contents = std::fs::read_to_string(&path).unwrap();
        assert_eq!(contents, track.to_srt());
    }
}
