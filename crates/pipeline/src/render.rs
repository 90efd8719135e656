//! The video render task: narrative text in, stored public URL out.
//!
//! Rendering is idempotent per node. A cheap pre-check short-circuits
//! nodes that already carry a URL, and the final write is a
//! compare-and-set, so even two racing renders converge on one stored
//! URL (first writer wins; the loser's upload is discarded).

use oneira_core::types::Id;
use oneira_core::{prompt, storage_keys};
use oneira_db::repositories::StoryNodeRepo;
use oneira_providers::{VideoGenClient, VideoGenError};
use oneira_storage::{ObjectStore, UploadError};
use sqlx::PgPool;

/// How a render request resolved.
#[derive(Debug, Clone)]
pub enum RenderOutcome {
    /// The node already had a video; nothing was generated or uploaded.
    AlreadyRendered(String),
    /// A fresh video was generated, uploaded, and recorded.
    Rendered(String),
}

impl RenderOutcome {
    /// The node's video URL, wherever it came from.
    pub fn video_url(&self) -> &str {
        match self {
            RenderOutcome::AlreadyRendered(url) | RenderOutcome::Rendered(url) => url,
        }
    }

    /// Whether this outcome was the short-circuit path.
    pub fn already_existed(&self) -> bool {
        matches!(self, RenderOutcome::AlreadyRendered(_))
    }
}

/// Errors from the render task.
#[derive(Debug, thiserror::Error)]
pub enum RenderError {
    /// The node to render does not exist.
    #[error("StoryNode {0} not found")]
    NodeNotFound(Id),

    /// The generation service failed (request, API error, or no asset).
    #[error(transparent)]
    Generation(#[from] VideoGenError),

    /// The signed upload was rejected or unreachable.
    #[error(transparent)]
    Upload(#[from] UploadError),

    /// A database read or write failed.
    #[error("database error: {0}")]
    Db(#[from] sqlx::Error),
}

/// Executes render requests against the generation service and the
/// object store.
pub struct Renderer {
    pool: PgPool,
    videogen: VideoGenClient,
    objects: ObjectStore,
}

impl Renderer {
    /// Create a renderer over the given services.
    pub fn new(pool: PgPool, videogen: VideoGenClient, objects: ObjectStore) -> Self {
        Self {
            pool,
            videogen,
            objects,
        }
    }

    /// Render the video for a story node and record its URL.
    ///
    /// Resolves the node's content, dream, and owner from a single read;
    /// the caller only supplies the node id.
    pub async fn render_node(&self, node_id: Id) -> Result<RenderOutcome, RenderError> {
        let node = StoryNodeRepo::find_with_owner(&self.pool, node_id)
            .await?
            .ok_or(RenderError::NodeNotFound(node_id))?;

        if let Some(url) = node.video_url {
            tracing::debug!(node_id = %node_id, "Video already exists; skipping render");
            return Ok(RenderOutcome::AlreadyRendered(url));
        }

        let visual_prompt = prompt::visual_prompt(&node.content);
        tracing::info!(node_id = %node_id, "Requesting video generation");
        let asset_url = self
            .videogen
            .generate(&visual_prompt, prompt::NEGATIVE_PROMPT)
            .await?;

        let bytes = self.videogen.download(&asset_url).await?;
        tracing::debug!(node_id = %node_id, bytes = bytes.len(), "Video asset downloaded");

        let key = storage_keys::video_key(node.user_id, node.dream_id, node.id);
        let public_url = self.objects.put(&key, &bytes, "video/mp4").await?;

        let won = StoryNodeRepo::set_video_url_if_absent(&self.pool, node.id, &public_url).await?;
        if !won {
            // A concurrent render got there first; its URL is the node's
            // URL and this upload is abandoned.
            let current = StoryNodeRepo::find_by_id(&self.pool, node.id)
                .await?
                .and_then(|n| n.video_url);
            return match current {
                Some(url) => {
                    tracing::warn!(
                        node_id = %node_id,
                        kept = %url,
                        discarded = %public_url,
                        "Lost video URL race; keeping the first writer's URL",
                    );
                    Ok(RenderOutcome::AlreadyRendered(url))
                }
                None => Err(RenderError::NodeNotFound(node_id)),
            };
        }

        tracing::info!(node_id = %node_id, video_url = %public_url, "Video rendered and recorded");
        Ok(RenderOutcome::Rendered(public_url))
    }
}
