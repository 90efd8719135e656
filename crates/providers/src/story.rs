//! Chat-completion client for narrative generation.
//!
//! One POST to the OpenAI-compatible `/v1/chat/completions` endpoint with
//! a system + user message pair, JSON response format requested. Returns
//! the raw assistant message content; parsing the narrative shape out of
//! it belongs to the pipeline.

use serde::Deserialize;
use serde_json::json;

use crate::util::{ensure_success, ApiFailure};

/// Default API base URL.
const DEFAULT_BASE_URL: &str = "https://api.openai.com";

/// Default chat model.
const DEFAULT_MODEL: &str = "gpt-4o";

/// Sampling temperature: high enough for vivid narration.
const TEMPERATURE: f32 = 0.8;

/// Upper bound on generated tokens per completion.
const MAX_TOKENS: u32 = 1024;

/// HTTP client for the chat-completion service.
pub struct StoryClient {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
    model: String,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatMessage,
}

#[derive(Debug, Deserialize)]
struct ChatMessage {
    content: String,
}

/// Errors from the chat-completion layer.
#[derive(Debug, thiserror::Error)]
pub enum StoryError {
    /// The HTTP request itself failed (network, DNS, TLS, etc.).
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The service returned a non-2xx status code.
    #[error("story generation error ({status}): {body}")]
    Api {
        /// HTTP status code.
        status: u16,
        /// Raw response body for debugging.
        body: String,
    },

    /// The service answered 2xx but without any completion choice.
    #[error("story generation returned no choices")]
    Empty,
}

impl From<ApiFailure> for StoryError {
    fn from(f: ApiFailure) -> Self {
        StoryError::Api {
            status: f.status,
            body: f.body,
        }
    }
}

impl StoryClient {
    /// Create a client with the default base URL and model.
    pub fn new(api_key: String) -> Self {
        Self::with_base_url(api_key, DEFAULT_BASE_URL.to_string())
    }

    /// Create a client against a specific base URL (used in tests).
    pub fn with_base_url(api_key: String, base_url: String) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url,
            api_key,
            model: DEFAULT_MODEL.to_string(),
        }
    }

    /// Override the chat model.
    pub fn with_model(mut self, model: String) -> Self {
        self.model = model;
        self
    }

    /// Run one completion and return the assistant message content.
    ///
    /// The request asks for a JSON object response, so the returned string
    /// is expected (but not guaranteed) to be a single JSON document.
    pub async fn complete(
        &self,
        system_prompt: &str,
        user_prompt: &str,
    ) -> Result<String, StoryError> {
        let body = json!({
            "model": self.model,
            "messages": [
                { "role": "system", "content": system_prompt },
                { "role": "user", "content": user_prompt },
            ],
            "temperature": TEMPERATURE,
            "max_tokens": MAX_TOKENS,
            "response_format": { "type": "json_object" },
        });

        let response = self
            .client
            .post(format!("{}/v1/chat/completions", self.base_url))
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await?;

        let response = ensure_success(response).await?;
        let mut parsed: ChatResponse = response.json().await?;

        if parsed.choices.is_empty() {
            return Err(StoryError::Empty);
        }
        Ok(parsed.choices.remove(0).message.content)
    }
}
