//! Signed PUT client for the S3-compatible object store.

use chrono::Utc;

use crate::sigv4::{self, Credentials};

/// Object-store configuration, loaded from `R2_*` environment variables.
#[derive(Debug, Clone)]
pub struct StorageConfig {
    /// Storage account identifier (part of the endpoint host).
    pub account_id: String,
    /// Access key id for signing.
    pub access_key_id: String,
    /// Secret access key for signing.
    pub secret_access_key: String,
    /// Target bucket name.
    pub bucket: String,
    /// Optional public base URL (CDN) returned instead of the bucket host.
    pub public_base_url: Option<String>,
}

impl StorageConfig {
    /// Load configuration from environment variables.
    ///
    /// | Env Var                | Required |
    /// |------------------------|----------|
    /// | `R2_ACCOUNT_ID`        | yes      |
    /// | `R2_ACCESS_KEY_ID`     | yes      |
    /// | `R2_SECRET_ACCESS_KEY` | yes      |
    /// | `R2_BUCKET_NAME`       | yes      |
    /// | `R2_PUBLIC_URL`        | no       |
    pub fn from_env() -> Self {
        Self {
            account_id: std::env::var("R2_ACCOUNT_ID").expect("R2_ACCOUNT_ID must be set"),
            access_key_id: std::env::var("R2_ACCESS_KEY_ID")
                .expect("R2_ACCESS_KEY_ID must be set"),
            secret_access_key: std::env::var("R2_SECRET_ACCESS_KEY")
                .expect("R2_SECRET_ACCESS_KEY must be set"),
            bucket: std::env::var("R2_BUCKET_NAME").expect("R2_BUCKET_NAME must be set"),
            public_base_url: std::env::var("R2_PUBLIC_URL").ok(),
        }
    }
}

/// Errors from the signed upload path.
#[derive(Debug, thiserror::Error)]
pub enum UploadError {
    /// The HTTP request itself failed (network, DNS, TLS, etc.).
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The store rejected the PUT.
    #[error("upload rejected ({status}): {body}")]
    Rejected {
        /// HTTP status code.
        status: u16,
        /// Raw response body for debugging.
        body: String,
    },
}

/// Uploads byte buffers to the object store with hand-signed PUT requests.
pub struct ObjectStore {
    client: reqwest::Client,
    config: StorageConfig,
    /// Override for the endpoint host (tests point this at a local server).
    endpoint_override: Option<String>,
}

impl ObjectStore {
    /// Create a store client for the configured bucket.
    pub fn new(config: StorageConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            config,
            endpoint_override: None,
        }
    }

    /// Point the client at an explicit `scheme://host[:port]` endpoint
    /// instead of the derived bucket host (used in tests).
    pub fn with_endpoint(mut self, endpoint: String) -> Self {
        self.endpoint_override = Some(endpoint);
        self
    }

    /// The bucket host the signature covers.
    fn host(&self) -> String {
        format!(
            "{}.{}.r2.cloudflarestorage.com",
            self.config.bucket, self.config.account_id
        )
    }

    /// PUT `payload` under `key` and return the public URL of the object.
    ///
    /// The signature is recomputed per call over the payload's real digest;
    /// nothing about the request is cached or reused.
    pub async fn put(
        &self,
        key: &str,
        payload: &[u8],
        content_type: &str,
    ) -> Result<String, UploadError> {
        let host = self.host();
        let credentials = Credentials {
            access_key_id: self.config.access_key_id.clone(),
            secret_access_key: self.config.secret_access_key.clone(),
        };

        let signed = sigv4::sign_put(&credentials, &host, key, payload, Utc::now());

        let url = match &self.endpoint_override {
            Some(endpoint) => format!("{endpoint}/{key}"),
            None => format!("https://{host}/{key}"),
        };

        let response = self
            .client
            .put(&url)
            .header("Host", &host)
            .header("x-amz-date", &signed.amz_date)
            .header("x-amz-content-sha256", &signed.payload_hash)
            .header("Authorization", &signed.authorization)
            .header("Content-Type", content_type)
            .body(payload.to_vec())
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "<unreadable body>".to_string());
            return Err(UploadError::Rejected {
                status: status.as_u16(),
                body,
            });
        }

        tracing::debug!(key, bytes = payload.len(), "Object uploaded");

        Ok(match &self.config.public_base_url {
            Some(base) => format!("{base}/{key}"),
            None => format!("https://{host}/{key}"),
        })
    }
}
