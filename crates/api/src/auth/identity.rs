//! Client for the external identity service.
//!
//! Bearer tokens are never minted or decoded locally — every token is
//! forwarded to the identity provider's user endpoint, which either
//! resolves it to a user or rejects it.

use oneira_core::types::Id;
use serde::Deserialize;

/// HTTP client for the identity service.
pub struct IdentityClient {
    client: reqwest::Client,
    base_url: String,
}

#[derive(Debug, Deserialize)]
struct UserResponse {
    id: Id,
}

/// Errors from token verification.
#[derive(Debug, thiserror::Error)]
pub enum IdentityError {
    /// The HTTP request itself failed (network, DNS, TLS, etc.).
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The identity service rejected the token.
    #[error("token rejected by identity service")]
    InvalidToken,

    /// The identity service answered with something unexpected.
    #[error("identity service error ({status}): {body}")]
    Service {
        /// HTTP status code.
        status: u16,
        /// Raw response body for debugging.
        body: String,
    },
}

impl IdentityClient {
    /// Create a client for the identity service at `base_url`.
    pub fn new(base_url: String) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url,
        }
    }

    /// Resolve a bearer token to the authenticated user's id.
    pub async fn verify_token(&self, token: &str) -> Result<Id, IdentityError> {
        let response = self
            .client
            .get(format!("{}/auth/v1/user", self.base_url))
            .bearer_auth(token)
            .send()
            .await?;

        let status = response.status();
        if status == reqwest::StatusCode::UNAUTHORIZED
            || status == reqwest::StatusCode::FORBIDDEN
        {
            return Err(IdentityError::InvalidToken);
        }
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "<unreadable body>".to_string());
            return Err(IdentityError::Service {
                status: status.as_u16(),
                body,
            });
        }

        let user: UserResponse = response.json().await?;
        Ok(user.id)
    }
}
