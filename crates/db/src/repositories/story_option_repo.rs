//! Repository for the `story_options` table.

use oneira_core::types::Id;
use sqlx::{PgExecutor, PgPool};

use crate::models::story_option::StoryOption;

/// Column list for `story_options` queries.
const COLUMNS: &str = "id, story_node_id, option_text, next_node_id";

/// Provides CRUD operations for story options.
pub struct StoryOptionRepo;

impl StoryOptionRepo {
    /// Insert one option row per text, in input order, as a single
    /// statement (so the batch shares the caller's transaction).
    ///
    /// The ordinality of the input array is stored in `position` so the
    /// generation order survives reads.
    pub async fn create_batch<'e>(
        executor: impl PgExecutor<'e>,
        story_node_id: Id,
        option_texts: &[String],
    ) -> Result<Vec<StoryOption>, sqlx::Error> {
        let query = format!(
            "INSERT INTO story_options (story_node_id, option_text, position) \
             SELECT $1, t.option_text, t.ord::smallint \
             FROM unnest($2::text[]) WITH ORDINALITY AS t(option_text, ord) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, StoryOption>(&query)
            .bind(story_node_id)
            .bind(option_texts)
            .fetch_all(executor)
            .await
    }

    /// List a node's options in generation order.
    pub async fn list_by_node(
        pool: &PgPool,
        story_node_id: Id,
    ) -> Result<Vec<StoryOption>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM story_options WHERE story_node_id = $1 ORDER BY position"
        );
        sqlx::query_as::<_, StoryOption>(&query)
            .bind(story_node_id)
            .fetch_all(pool)
            .await
    }
}
