//! HTTP client for the Oneira API's polling surface.

use async_trait::async_trait;
use oneira_core::types::Id;
use serde::Deserialize;

use crate::poller::{StatusReport, StatusSource, VideoReadiness};

/// A caller-side handle on the API, authenticated with a bearer token.
pub struct ApiClient {
    client: reqwest::Client,
    base_url: String,
    token: String,
}

/// Wire shape of `check-video-status` responses.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct StatusResponse {
    video_url: Option<String>,
    status: StatusField,
}

#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(rename_all = "snake_case")]
enum StatusField {
    Ready,
    Pending,
    NotFound,
}

/// Errors from the caller-side API client.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// The HTTP request itself failed (network, DNS, TLS, etc.).
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The API returned an unexpected status code.
    #[error("API error ({status}): {body}")]
    Api {
        /// HTTP status code.
        status: u16,
        /// Raw response body for debugging.
        body: String,
    },
}

impl ApiClient {
    /// Create a client for the API at `base_url` with a bearer token.
    pub fn new(base_url: String, token: String) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url,
            token,
        }
    }

    /// One `check-video-status` call.
    ///
    /// A 404 is a well-formed answer here (`not_found` with a status
    /// body), not a transport failure — the poller decides what to do
    /// with it.
    pub async fn check_video_status(&self, node_id: Id) -> Result<StatusReport, ApiError> {
        let response = self
            .client
            .get(format!(
                "{}/api/v1/check-video-status?nodeId={node_id}",
                self.base_url
            ))
            .bearer_auth(&self.token)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() && status != reqwest::StatusCode::NOT_FOUND {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "<unreadable body>".to_string());
            return Err(ApiError::Api {
                status: status.as_u16(),
                body,
            });
        }

        let parsed: StatusResponse = response.json().await?;
        Ok(StatusReport {
            video_url: parsed.video_url,
            status: match parsed.status {
                StatusField::Ready => VideoReadiness::Ready,
                StatusField::Pending => VideoReadiness::Pending,
                StatusField::NotFound => VideoReadiness::NotFound,
            },
        })
    }
}

#[async_trait]
impl StatusSource for ApiClient {
    type Error = ApiError;

    async fn fetch_status(&self, node_id: Id) -> Result<StatusReport, ApiError> {
        self.check_video_status(node_id).await
    }
}
