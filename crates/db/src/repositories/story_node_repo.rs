//! Repository for the `story_nodes` table.

use oneira_core::types::Id;
use sqlx::{PgExecutor, PgPool};

use crate::models::story_node::{NodeWithOwner, RenderedNode, StoryNode};

/// Column list for `story_nodes` queries.
const COLUMNS: &str = "id, dream_id, parent_node_id, content, video_url, created_at";

/// Provides CRUD operations for story nodes.
pub struct StoryNodeRepo;

impl StoryNodeRepo {
    /// Insert a new story node under a dream.
    pub async fn create<'e>(
        executor: impl PgExecutor<'e>,
        dream_id: Id,
        parent_node_id: Option<Id>,
        content: &str,
        video_url: Option<&str>,
    ) -> Result<StoryNode, sqlx::Error> {
        let query = format!(
            "INSERT INTO story_nodes (dream_id, parent_node_id, content, video_url) \
             VALUES ($1, $2, $3, $4) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, StoryNode>(&query)
            .bind(dream_id)
            .bind(parent_node_id)
            .bind(content)
            .bind(video_url)
            .fetch_one(executor)
            .await
    }

    /// Find a story node by its ID.
    pub async fn find_by_id(pool: &PgPool, id: Id) -> Result<Option<StoryNode>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM story_nodes WHERE id = $1");
        sqlx::query_as::<_, StoryNode>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Find a story node joined with its dream's owning user.
    ///
    /// The render task resolves everything it needs (content, dream, owner)
    /// from this single read.
    pub async fn find_with_owner(
        pool: &PgPool,
        id: Id,
    ) -> Result<Option<NodeWithOwner>, sqlx::Error> {
        sqlx::query_as::<_, NodeWithOwner>(
            "SELECT n.id, n.dream_id, d.user_id, n.content, n.video_url \
             FROM story_nodes n \
             JOIN dreams d ON d.id = n.dream_id \
             WHERE n.id = $1",
        )
        .bind(id)
        .fetch_optional(pool)
        .await
    }

    /// Ordered content of every node in a dream, oldest first.
    ///
    /// Used as continuation context when a session branches from a parent
    /// node.
    pub async fn list_content_for_dream(
        pool: &PgPool,
        dream_id: Id,
    ) -> Result<Vec<String>, sqlx::Error> {
        sqlx::query_scalar::<_, String>(
            "SELECT content FROM story_nodes WHERE dream_id = $1 ORDER BY created_at ASC",
        )
        .bind(dream_id)
        .fetch_all(pool)
        .await
    }

    /// Set a node's video URL if and only if it has none yet.
    ///
    /// Compare-and-set: returns `false` when another writer already set a
    /// URL (or the node does not exist), in which case the stored value is
    /// left untouched.
    pub async fn set_video_url_if_absent(
        pool: &PgPool,
        id: Id,
        video_url: &str,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE story_nodes SET video_url = $2 WHERE id = $1 AND video_url IS NULL",
        )
        .bind(id)
        .bind(video_url)
        .execute(pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Most recently rendered nodes (those with a video URL), newest first.
    pub async fn list_recent_rendered(
        pool: &PgPool,
        limit: i64,
    ) -> Result<Vec<RenderedNode>, sqlx::Error> {
        sqlx::query_as::<_, RenderedNode>(
            "SELECT video_url, content, created_at FROM story_nodes \
             WHERE video_url IS NOT NULL \
             ORDER BY created_at DESC \
             LIMIT $1",
        )
        .bind(limit)
        .fetch_all(pool)
        .await
    }
}
