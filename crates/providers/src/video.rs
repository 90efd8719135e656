//! Text-to-video generation client.
//!
//! Wraps the fal.ai `fast-animatediff` text-to-video endpoint with a
//! fixed low-latency configuration (few frames, few inference steps), and
//! downloads the rendered asset. Tuned for speed over fidelity: a short
//! clip in tens of seconds beats a pretty one in minutes here.

use serde::Deserialize;
use serde_json::json;

use crate::util::{ensure_success, ApiFailure};

/// Default API base URL.
const DEFAULT_BASE_URL: &str = "https://fal.run";

/// Generation endpoint path.
const MODEL_PATH: &str = "/fal-ai/fast-animatediff/text-to-video";

/// 4 seconds at 8 fps (max supported by the model).
const NUM_FRAMES: u32 = 32;

/// Low step count, optimized for latency.
const NUM_INFERENCE_STEPS: u32 = 6;

/// Balanced quality vs speed.
const GUIDANCE_SCALE: f32 = 6.0;

/// Output frame rate.
const FPS: u32 = 8;

/// Dynamic movement.
const MOTION_SCALE: f32 = 1.3;

/// HTTP client for the video generation service.
pub struct VideoGenClient {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
}

#[derive(Debug, Deserialize)]
struct GenerationResponse {
    video: Option<AssetRef>,
    #[serde(default)]
    images: Vec<AssetRef>,
}

#[derive(Debug, Deserialize)]
struct AssetRef {
    url: String,
}

/// Errors from the video generation layer.
#[derive(Debug, thiserror::Error)]
pub enum VideoGenError {
    /// The HTTP request itself failed (network, DNS, TLS, etc.).
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The service returned a non-2xx status code.
    #[error("video generation error ({status}): {body}")]
    Api {
        /// HTTP status code.
        status: u16,
        /// Raw response body for debugging.
        body: String,
    },

    /// The service answered 2xx but the response carried no asset URL.
    #[error("video generation returned no asset URL")]
    MissingAsset,
}

impl From<ApiFailure> for VideoGenError {
    fn from(f: ApiFailure) -> Self {
        VideoGenError::Api {
            status: f.status,
            body: f.body,
        }
    }
}

impl VideoGenClient {
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

    /// Request a clip for the given prompt and return the asset URL.
    pub async fn generate(
        &self,
        prompt: &str,
        negative_prompt: &str,
    ) -> Result<String, VideoGenError> {
        let body = json!({
            "prompt": prompt,
            "negative_prompt": negative_prompt,
            "num_frames": NUM_FRAMES,
            "num_inference_steps": NUM_INFERENCE_STEPS,
            "guidance_scale": GUIDANCE_SCALE,
            "fps": FPS,
            "motion_scale": MOTION_SCALE,
        });

        let response = self
            .client
            .post(format!("{}{}", self.base_url, MODEL_PATH))
            .header("Authorization", format!("Key {}", self.api_key))
            .json(&body)
            .send()
            .await?;

        let response = ensure_success(response).await?;
        let parsed: GenerationResponse = response.json().await?;

        // The model normally returns `video.url`; some responses fall back
        // to an `images` array.
        parsed
            .video
            .map(|v| v.url)
            .or_else(|| parsed.images.into_iter().next().map(|i| i.url))
            .ok_or(VideoGenError::MissingAsset)
    }

    /// Download the rendered binary asset.
    pub async fn download(&self, url: &str) -> Result<Vec<u8>, VideoGenError> {
        let response = self.client.get(url).send().await?;
        let response = ensure_success(response).await?;
        Ok(response.bytes().await?.to_vec())
    }
}
