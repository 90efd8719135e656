//! The process-dream orchestrator.
//!
//! Sequences one dream increment: transcription (audio path only),
//! context-augmented narrative generation, transactional persistence, and
//! the enqueue of a durable render job. Returns as soon as the text is
//! persisted — rendering happens behind the queue, never on this path.

use chrono::Utc;
use oneira_core::error::CoreError;
use oneira_core::storage_keys;
use oneira_core::types::Id;
use oneira_db::models::story_node::StoryNode;
use oneira_db::models::story_option::StoryOption;
use oneira_db::repositories::RenderJobRepo;
use oneira_providers::{MemoryClient, SpeechClient, SpeechError, StoryClient};
use oneira_storage::ObjectStore;
use serde::Serialize;
use sqlx::PgPool;

use crate::narrative::{self, NarrativeError};
use crate::store::{self, SaveDreamArgs, StoreError};

/// A decoded audio recording with its declared media type.
#[derive(Debug)]
pub struct AudioInput {
    pub bytes: Vec<u8>,
    pub mime_type: String,
}

/// One dream increment request, already decoded and authenticated.
#[derive(Debug)]
pub struct ProcessDreamInput {
    /// Raw recording; mutually exclusive with `text`.
    pub audio: Option<AudioInput>,
    /// Literal text; bypasses transcription entirely.
    pub text: Option<String>,
    /// Continue this dream session.
    pub dream_id: Option<Id>,
    /// Branch from this node.
    pub parent_node_id: Option<Id>,
    /// Enqueue a render job for the new node.
    pub generate_video: bool,
}

/// Whether a render was scheduled for the returned node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum VideoStatus {
    Generating,
    Disabled,
}

/// The synchronous result of one dream increment: text only, video later.
#[derive(Debug)]
pub struct ProcessedDream {
    pub dream_id: Id,
    pub node: StoryNode,
    pub options: Vec<StoryOption>,
    pub transcript: String,
    pub video_status: VideoStatus,
}

/// Errors from the orchestrated path.
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    /// Input validation or other domain failure.
    #[error(transparent)]
    Core(#[from] CoreError),

    /// The speech-to-text service failed.
    #[error("transcription failed: {0}")]
    Speech(#[from] SpeechError),

    /// Narrative generation failed.
    #[error(transparent)]
    Narrative(#[from] NarrativeError),

    /// The persistence unit failed (and was rolled back).
    #[error(transparent)]
    Store(#[from] StoreError),

    /// Enqueueing the render job failed.
    #[error("failed to enqueue render job: {0}")]
    Queue(sqlx::Error),
}

/// The fully wired pipeline, shared by every request handler.
pub struct DreamPipeline {
    pool: PgPool,
    speech: SpeechClient,
    story: StoryClient,
    memory: Option<MemoryClient>,
    objects: ObjectStore,
}

impl DreamPipeline {
    /// Wire the pipeline over its services.
    pub fn new(
        pool: PgPool,
        speech: SpeechClient,
        story: StoryClient,
        memory: Option<MemoryClient>,
        objects: ObjectStore,
    ) -> Self {
        Self {
            pool,
            speech,
            story,
            memory,
            objects,
        }
    }

    /// Run one dream increment for an authenticated user.
    pub async fn process(
        &self,
        user_id: Id,
        input: ProcessDreamInput,
    ) -> Result<ProcessedDream, PipelineError> {
        let transcript = match (input.audio, input.text) {
            (Some(audio), None) => self.transcribe_and_archive(user_id, input.dream_id, audio).await?,
            (None, Some(text)) => text,
            (None, None) => {
                return Err(CoreError::Validation(
                    "Either audioBase64 or textInput must be provided".into(),
                )
                .into());
            }
            (Some(_), Some(_)) => {
                return Err(CoreError::Validation(
                    "audioBase64 and textInput are mutually exclusive".into(),
                )
                .into());
            }
        };

        let generated = narrative::generate_story(
            &self.pool,
            &self.story,
            self.memory.as_ref(),
            user_id,
            &transcript,
            input.dream_id,
            input.parent_node_id,
        )
        .await?;

        let saved = store::save_dream_session(
            &self.pool,
            SaveDreamArgs {
                user_id,
                transcript: &transcript,
                content: &generated.content,
                options: &generated.options,
                video_url: None,
                dream_id: input.dream_id,
                parent_node_id: input.parent_node_id,
            },
        )
        .await?;

        let video_status = if input.generate_video {
            match RenderJobRepo::submit(&self.pool, saved.node.id, user_id)
                .await
                .map_err(PipelineError::Queue)?
            {
                Some(job) => {
                    tracing::info!(
                        job_id = %job.id,
                        node_id = %saved.node.id,
                        "Render job enqueued",
                    );
                }
                None => {
                    tracing::debug!(
                        node_id = %saved.node.id,
                        "Render job already active for node; not enqueueing another",
                    );
                }
            }
            VideoStatus::Generating
        } else {
            VideoStatus::Disabled
        };

        Ok(ProcessedDream {
            dream_id: saved.dream_id,
            node: saved.node,
            options: saved.options,
            transcript,
            video_status,
        })
    }

    /// Audio path: transcribe, then archive the raw recording.
    ///
    /// The archive write is best-effort — a storage failure must not cost
    /// the user their dream.
    async fn transcribe_and_archive(
        &self,
        user_id: Id,
        dream_id: Option<Id>,
        audio: AudioInput,
    ) -> Result<String, PipelineError> {
        let extension = storage_keys::audio_extension(&audio.mime_type);
        let transcript = self
            .speech
            .transcribe(
                audio.bytes.clone(),
                &audio.mime_type,
                format!("audio.{extension}"),
            )
            .await?;

        if transcript.trim().is_empty() {
            return Err(CoreError::Upstream {
                service: "speech-to-text",
                message: "transcription produced no text".into(),
            }
            .into());
        }

        let key = storage_keys::audio_key(
            user_id,
            dream_id,
            Utc::now().timestamp_millis(),
            extension,
        );
        if let Err(e) = self.objects.put(&key, &audio.bytes, &audio.mime_type).await {
            tracing::warn!(key = %key, error = %e, "Audio archive upload failed; continuing");
        }

        Ok(transcript)
    }
}
