//! Environment configuration.
//!
//! Loaded once at startup and handed to each component at construction, so
//! nothing reads ambient environment state at call time.

use std::env;

#[derive(Clone, Debug)]
pub struct Config {
    /// HTTP server bind address
    pub addr: String,
    /// HTTP server port
    pub port: String,
    /// Directory uploaded videos are stored in
    pub upload_dir: String,
    /// Speech recognition endpoint
    pub speech_endpoint: String,
    /// API key for the speech service
    pub speech_api_key: String,
    /// Recognition language
    pub language_code: String,
    /// Playback segment length in seconds
    pub video_segment_seconds: f64,
    /// Transcription chunk length in seconds
    pub audio_chunk_seconds: f64,
    /// ffmpeg binary
    pub ffmpeg_path: String,
    /// ffprobe binary
    pub ffprobe_path: String,
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        dotenv::dotenv().ok();

        Self {
            addr: env::var("ADDR").unwrap_or_else(|_| String::from("127.0.0.1")),
            port: env::var("PORT").unwrap_or_else(|_| String::from("3000")),
            upload_dir: env::var("UPLOAD_DIR").unwrap_or_else(|_| String::from("./uploads")),
            speech_endpoint: env::var("SPEECH_ENDPOINT").unwrap_or_else(|_| {
                String::from("https://speech.googleapis.com/v1/speech:recognize")
            }),
            speech_api_key: env::var("GOOGLE_CLOUD_API_KEY").unwrap_or_default(),
            language_code: env::var("LANGUAGE_CODE").unwrap_or_else(|_| String::from("pt-BR")),
            // Non-positive lengths fall back to the defaults.
            video_segment_seconds: env::var("VIDEO_SEGMENT_SECONDS")
                .ok()
                .and_then(|v| v.parse().ok())
                .filter(|v: &f64| *v > 0.0)
                .unwrap_or(60.0),
            audio_chunk_seconds: env::var("AUDIO_CHUNK_SECONDS")
                .ok()
                .and_then(|v| v.parse().ok())
                .filter(|v: &f64| *v > 0.0)
                .unwrap_or(59.0),
            ffmpeg_path: env::var("FFMPEG_PATH").unwrap_or_else(|_| String::from("ffmpeg")),
            ffprobe_path: env::var("FFPROBE_PATH").unwrap_or_else(|_| String::from("ffprobe")),
        }
    }
}
