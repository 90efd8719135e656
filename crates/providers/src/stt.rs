//! Speech-to-text client.
//!
//! Wraps the ElevenLabs speech-to-text HTTP API: one multipart POST with
//! the audio bytes and the transcription model id.

use serde::Deserialize;

use crate::util::{ensure_success, ApiFailure};

/// Default API base URL.
const DEFAULT_BASE_URL: &str = "https://api.elevenlabs.io";

/// Transcription model identifier sent with every request.
const MODEL_ID: &str = "scribe_v1";

/// HTTP client for the speech-to-text service.
pub struct SpeechClient {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
}

/// Response body of the transcription endpoint.
#[derive(Debug, Deserialize)]
struct TranscriptionResponse {
    text: String,
}

/// Errors from the speech-to-text layer.
#[derive(Debug, thiserror::Error)]
pub enum SpeechError {
    /// The HTTP request itself failed (network, DNS, TLS, etc.).
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The service returned a non-2xx status code.
    #[error("speech-to-text error ({status}): {body}")]
    Api {
        /// HTTP status code.
        status: u16,
        /// Raw response body for debugging.
        body: String,
    },
}

impl From<ApiFailure> for SpeechError {
    fn from(f: ApiFailure) -> Self {
        SpeechError::Api {
            status: f.status,
            body: f.body,
        }
    }
}

impl SpeechClient {
    /// Create a client with the default base URL.
    pub fn new(api_key: String) -> Self {
        Self::with_base_url(api_key, DEFAULT_BASE_URL.to_string())
    }

    /// Create a client against a specific base URL (used in tests).
    pub fn with_base_url(api_key: String, base_url: String) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url,
            api_key,
        }
    }

    /// Transcribe an audio recording to plain text.
    ///
    /// `file_name` carries the extension the service uses for container
    /// detection (e.g. `audio.webm`).
    pub async fn transcribe(
        &self,
        audio: Vec<u8>,
        mime_type: &str,
        file_name: String,
    ) -> Result<String, SpeechError> {
        let part = reqwest::multipart::Part::bytes(audio)
            .file_name(file_name)
            .mime_str(mime_type)?;
        let form = reqwest::multipart::Form::new()
            .part("file", part)
            .text("model_id", MODEL_ID);

        let response = self
            .client
            .post(format!("{}/v1/speech-to-text", self.base_url))
            .header("xi-api-key", &self.api_key)
            .multipart(form)
            .send()
            .await?;

        let response = ensure_success(response).await?;
        let parsed: TranscriptionResponse = response.json().await?;

        tracing::debug!(chars = parsed.text.len(), "Transcription complete");
        Ok(parsed.text)
    }
}
