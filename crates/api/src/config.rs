//! Server and upstream-provider configuration.

/// Server configuration loaded from environment variables.
///
/// All fields except the identity URL have defaults suitable for local
/// development. In production, override via environment variables.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Bind address (default: `0.0.0.0`).
    pub host: String,
    /// Bind port (default: `3000`).
    pub port: u16,
    /// HTTP request timeout in seconds (default: `30`).
    pub request_timeout_secs: u64,
    /// Base URL of the external identity service that bearer tokens are
    /// verified against.
    pub identity_url: String,
}

impl ServerConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                | Default   |
    /// |------------------------|-----------|
    /// | `HOST`                 | `0.0.0.0` |
    /// | `PORT`                 | `3000`    |
    /// | `REQUEST_TIMEOUT_SECS` | `30`      |
    /// | `IDENTITY_URL`         | required  |
    pub fn from_env() -> Self {
        let host = std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".into());

        let port: u16 = std::env::var("PORT")
            .unwrap_or_else(|_| "3000".into())
            .parse()
            .expect("PORT must be a valid u16");

        let request_timeout_secs: u64 = std::env::var("REQUEST_TIMEOUT_SECS")
            .unwrap_or_else(|_| "30".into())
            .parse()
            .expect("REQUEST_TIMEOUT_SECS must be a valid u64");

        let identity_url = std::env::var("IDENTITY_URL").expect("IDENTITY_URL must be set");

        Self {
            host,
            port,
            request_timeout_secs,
            identity_url,
        }
    }
}

/// API keys for the upstream generation services.
///
/// The memory key is the only optional one: without it the pipeline
/// generates with no cross-session recall (and says so in the logs).
#[derive(Debug, Clone)]
pub struct ProviderSettings {
    /// Speech-to-text service key (`ELEVENLABS_API_KEY`).
    pub speech_api_key: String,
    /// Chat-completion service key (`OPENAI_API_KEY`).
    pub story_api_key: String,
    /// Optional chat model override (`STORY_MODEL`).
    pub story_model: Option<String>,
    /// Optional memory service key (`MEM0_API_KEY`).
    pub memory_api_key: Option<String>,
    /// Video generation service key (`FAL_API_KEY`).
    pub videogen_api_key: String,
}

impl ProviderSettings {
    /// Load provider keys from environment variables.
    pub fn from_env() -> Self {
        let memory_api_key = std::env::var("MEM0_API_KEY").ok();
        if memory_api_key.is_none() {
            tracing::warn!("MEM0_API_KEY not configured; dreams will be generated without memory recall");
        }

        Self {
            speech_api_key: std::env::var("ELEVENLABS_API_KEY")
                .expect("ELEVENLABS_API_KEY must be set"),
            story_api_key: std::env::var("OPENAI_API_KEY").expect("OPENAI_API_KEY must be set"),
            story_model: std::env::var("STORY_MODEL").ok(),
            memory_api_key,
            videogen_api_key: std::env::var("FAL_API_KEY").expect("FAL_API_KEY must be set"),
        }
    }
}
