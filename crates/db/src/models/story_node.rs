//! Story node entity model and query projections.

use oneira_core::types::{Id, Timestamp};
use serde::Serialize;
use sqlx::FromRow;

/// A row from the `story_nodes` table: one generated narrative segment.
///
/// `video_url` stays `NULL` until the render pipeline finishes; once set it
/// is never cleared or overwritten (enforced by the compare-and-set update
/// in the repository, first writer wins).
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct StoryNode {
    pub id: Id,
    pub dream_id: Id,
    pub parent_node_id: Option<Id>,
    pub content: String,
    pub video_url: Option<String>,
    pub created_at: Timestamp,
}

/// A story node joined with its dream's owner, as the render task needs it.
#[derive(Debug, Clone, FromRow)]
pub struct NodeWithOwner {
    pub id: Id,
    pub dream_id: Id,
    pub user_id: Id,
    pub content: String,
    pub video_url: Option<String>,
}

/// Projection for the public random-video endpoint: only rendered nodes.
#[derive(Debug, Clone, FromRow)]
pub struct RenderedNode {
    pub video_url: String,
    pub content: String,
    pub created_at: Timestamp,
}
