//! Repository for the `dreams` table.

use oneira_core::types::Id;
use sqlx::{PgExecutor, PgPool};

use crate::models::dream::Dream;

/// Column list for `dreams` queries.
const COLUMNS: &str = "id, user_id, transcript, created_at";

/// Provides CRUD operations for dream sessions.
pub struct DreamRepo;

impl DreamRepo {
    /// Create a new dream session for a user with its first transcript.
    pub async fn create<'e>(
        executor: impl PgExecutor<'e>,
        user_id: Id,
        transcript: &str,
    ) -> Result<Dream, sqlx::Error> {
        let query = format!(
            "INSERT INTO dreams (user_id, transcript) VALUES ($1, $2) RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Dream>(&query)
            .bind(user_id)
            .bind(transcript)
            .fetch_one(executor)
            .await
    }

    /// Overwrite an existing dream's transcript (session continued with
    /// new audio). Returns `false` if no dream with that id exists.
    pub async fn update_transcript<'e>(
        executor: impl PgExecutor<'e>,
        id: Id,
        transcript: &str,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("UPDATE dreams SET transcript = $2 WHERE id = $1")
            .bind(id)
            .bind(transcript)
            .execute(executor)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Find a dream by its ID.
    pub async fn find_by_id(pool: &PgPool, id: Id) -> Result<Option<Dream>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM dreams WHERE id = $1");
        sqlx::query_as::<_, Dream>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }
}
