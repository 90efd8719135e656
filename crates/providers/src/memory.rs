//! Memory/context store client.
//!
//! Wraps the Mem0-style memory API: semantic search over a user's prior
//! dreams, and appending new material for future sessions. Both calls are
//! treated as best-effort by the pipeline — this client only reports what
//! happened.

use oneira_core::types::Id;
use serde::Deserialize;
use serde_json::json;

use crate::util::{ensure_success, ApiFailure};

/// Default API base URL.
const DEFAULT_BASE_URL: &str = "https://api.mem0.ai";

/// HTTP client for the memory/context service.
pub struct MemoryClient {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    results: Vec<SearchResult>,
}

#[derive(Debug, Deserialize)]
struct SearchResult {
    memory: String,
}

/// Errors from the memory/context layer.
#[derive(Debug, thiserror::Error)]
pub enum MemoryError {
    /// The HTTP request itself failed (network, DNS, TLS, etc.).
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The service returned a non-2xx status code.
    #[error("memory service error ({status}): {body}")]
    Api {
        /// HTTP status code.
        status: u16,
        /// Raw response body for debugging.
        body: String,
    },
}

impl From<ApiFailure> for MemoryError {
    fn from(f: ApiFailure) -> Self {
        MemoryError::Api {
            status: f.status,
            body: f.body,
        }
    }
}

impl MemoryClient {
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

    /// Search the user's memories for fragments relevant to `query`.
    pub async fn search(&self, user_id: Id, query: &str) -> Result<Vec<String>, MemoryError> {
        let body = json!({
            "query": query,
            "user_id": user_id.to_string(),
        });

        let response = self
            .client
            .post(format!("{}/v1/memories/search/", self.base_url))
            .header("Authorization", format!("Token {}", self.api_key))
            .json(&body)
            .send()
            .await?;

        let response = ensure_success(response).await?;
        let parsed: SearchResponse = response.json().await?;
        Ok(parsed.results.into_iter().map(|r| r.memory).collect())
    }

    /// Store new dream material under the user's memory stream.
    pub async fn add(&self, user_id: Id, content: &str) -> Result<(), MemoryError> {
        let body = json!({
            "messages": [{ "role": "user", "content": content }],
            "user_id": user_id.to_string(),
        });

        let response = self
            .client
            .post(format!("{}/v1/memories/", self.base_url))
            .header("Authorization", format!("Token {}", self.api_key))
            .json(&body)
            .send()
            .await?;

        ensure_success(response).await?;
        Ok(())
    }
}
