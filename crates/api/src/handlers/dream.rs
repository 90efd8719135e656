//! Handler for the `process-dream` endpoint.
//!
//! Accepts one dream increment (audio or text), runs the synchronous half
//! of the pipeline, and returns the generated node immediately; any video
//! work happens behind the render queue.

use axum::extract::State;
use axum::Json;
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use oneira_core::error::CoreError;
use oneira_core::types::{Id, Timestamp};
use oneira_pipeline::{AudioInput, ProcessDreamInput, ProcessedDream, VideoStatus};
use serde::{Deserialize, Serialize};

use crate::auth::AuthUser;
use crate::error::{AppError, AppResult};
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Request / response types
// ---------------------------------------------------------------------------

/// POST body for `process-dream`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProcessDreamRequest {
    /// Base64-encoded audio file (alternative to `textInput`).
    pub audio_base64: Option<String>,
    /// MIME type of the audio (required when `audioBase64` is present).
    pub audio_mime_type: Option<String>,
    /// Direct text input (alternative to `audioBase64`).
    pub text_input: Option<String>,
    /// Existing dream session to continue.
    pub dream_id: Option<Id>,
    /// Parent story node, for branching narratives.
    pub parent_node_id: Option<Id>,
    /// Whether to schedule video generation (default: true).
    pub generate_video: Option<bool>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StoryNodePayload {
    pub id: Id,
    pub content: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub video_url: Option<String>,
    pub created_at: Timestamp,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StoryOptionPayload {
    pub id: Id,
    pub option_text: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProcessDreamResponse {
    pub dream_id: Id,
    pub story_node: StoryNodePayload,
    pub options: Vec<StoryOptionPayload>,
    pub transcript: String,
    pub video_status: VideoStatus,
}

impl From<ProcessedDream> for ProcessDreamResponse {
    fn from(processed: ProcessedDream) -> Self {
        Self {
            dream_id: processed.dream_id,
            story_node: StoryNodePayload {
                id: processed.node.id,
                content: processed.node.content,
                video_url: processed.node.video_url,
                created_at: processed.node.created_at,
            },
            options: processed
                .options
                .into_iter()
                .map(|o| StoryOptionPayload {
                    id: o.id,
                    option_text: o.option_text,
                })
                .collect(),
            transcript: processed.transcript,
            video_status: processed.video_status,
        }
    }
}

// ---------------------------------------------------------------------------
// Handler
// ---------------------------------------------------------------------------

/// POST /api/v1/process-dream
///
/// Runs one dream increment and returns the new node, its 3 options, and
/// the transcript. `videoStatus` reports whether a render was scheduled
/// (`generating`) or skipped (`disabled`).
pub async fn process_dream(
    auth: AuthUser,
    State(state): State<AppState>,
    Json(body): Json<ProcessDreamRequest>,
) -> AppResult<Json<ProcessDreamResponse>> {
    let audio = decode_audio(body.audio_base64, body.audio_mime_type)?;

    let input = ProcessDreamInput {
        audio,
        text: body.text_input,
        dream_id: body.dream_id,
        parent_node_id: body.parent_node_id,
        generate_video: body.generate_video.unwrap_or(true),
    };

    tracing::info!(user_id = %auth.user_id, "Processing dream");
    let processed = state.pipeline.process(auth.user_id, input).await?;

    Ok(Json(processed.into()))
}

/// Decode the optional base64 audio payload into raw bytes.
fn decode_audio(
    audio_base64: Option<String>,
    audio_mime_type: Option<String>,
) -> Result<Option<AudioInput>, AppError> {
    match (audio_base64, audio_mime_type) {
        (Some(encoded), Some(mime_type)) => {
            let bytes = BASE64.decode(encoded).map_err(|e| {
                AppError::Core(CoreError::Validation(format!(
                    "audioBase64 is not valid base64: {e}"
                )))
            })?;
            Ok(Some(AudioInput { bytes, mime_type }))
        }
        (Some(_), None) => Err(AppError::Core(CoreError::Validation(
            "audioMimeType required when sending audio".into(),
        ))),
        (None, _) => Ok(None),
    }
}
