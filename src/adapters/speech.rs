//! Speech Transcription Client for a Google-style recognize endpoint.
//!
//! Recognition is best-effort: transport failures, non-2xx responses and
//! responses without a `results` field all degrade to an empty transcript for
//! that chunk, with a warning, so one bad chunk cannot abort the run.

use crate::ports::speech::SpeechPort;
use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use serde_json::{json, Value};
use std::error::Error;
use std::fmt;
use std::path::Path;

/// Sample format the audio chunks are extracted in.
const ENCODING: &str = "LINEAR16";
const SAMPLE_RATE_HERTZ: u32 = 16_000;

#[derive(Debug)]
pub enum SpeechError {
    /// Request never completed (connect, DNS, body decode).
    Transport(String),
    /// Service answered with a non-success status.
    Status(u16, String),
    /// Response carried no `results` field (service error or pure silence).
    MissingResults,
}

impl fmt::Display for SpeechError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SpeechError::Transport(e) => write!(f, "speech transport error: {}", e),
            SpeechError::Status(code, body) => {
                write!(f, "speech service returned {}: {}", code, body)
            }
            SpeechError::MissingResults => write!(f, "speech response has no results"),
        }
    }
}

impl std::error::Error for SpeechError {}

/// One recognize round-trip, JSON in and JSON out.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SpeechTransport: Send + Sync {
    async fn recognize(&self, body: Value) -> Result<Value, SpeechError>;
}

/// HTTP transport posting to `{endpoint}?key={api_key}`.
pub struct HttpSpeechTransport {
    client: reqwest::Client,
    endpoint: String,
    api_key: String,
}

impl HttpSpeechTransport {
    pub fn new(endpoint: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            endpoint: endpoint.into(),
            api_key: api_key.into(),
        }
    }
}

#[async_trait]
impl SpeechTransport for HttpSpeechTransport {
    async fn recognize(&self, body: Value) -> Result<Value, SpeechError> {
        let response = self
            .client
            .post(&self.endpoint)
            .query(&[("key", self.api_key.as_str())])
            .json(&body)
            .send()
            .await
            .map_err(|e| SpeechError::Transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(SpeechError::Status(status.as_u16(), body));
        }

        response
            .json()
            .await
            .map_err(|e| SpeechError::Transport(e.to_string()))
    }
}

pub struct GoogleSpeechClient<T> {
    transport: T,
    language_code: String,
}

impl<T: SpeechTransport> GoogleSpeechClient<T> {
    pub fn new(transport: T, language_code: impl Into<String>) -> Self {
        Self {
            transport,
            language_code: language_code.into(),
        }
    }

    async fn recognize_text(&self, body: Value) -> Result<String, SpeechError> {
        let response = self.transport.recognize(body).await?;
        let results = response
            .get("results")
            .and_then(Value::as_array)
            .ok_or(SpeechError::MissingResults)?;
        let transcripts: Vec<&str> = results
            .iter()
            .filter_map(|result| {
                result
                    .get("alternatives")?
                    .get(0)?
                    .get("transcript")?
                    .as_str()
            })
            .collect();
        Ok(transcripts.join(" "))
    }
}

#[async_trait]
impl<T: SpeechTransport> SpeechPort for GoogleSpeechClient<T> {
    async fn transcribe(
        &self,
        chunk_path: &Path,
    ) -> Result<String, Box<dyn Error + Send + Sync>> {
        // An unreadable chunk is a real failure and propagates.
        let audio = tokio::fs::read(chunk_path).await?;
        let body = json!({
            "config": {
                "encoding": ENCODING,
                "sampleRateHertz": SAMPLE_RATE_HERTZ,
                "languageCode": self.language_code,
            },
            "audio": {
                "content": BASE64.encode(&audio),
            },
        });

        match self.recognize_text(body).await {
            Ok(text) => Ok(text),
            Err(e) => {
                tracing::warn!(
                    chunk = %chunk_path.display(),
                    error = %e,
                    "transcription failed, degrading to empty text"
                );
                Ok(String::new())
            }
        }
    }
}
