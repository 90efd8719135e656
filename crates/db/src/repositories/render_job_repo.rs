//! Repository for the `render_jobs` table (durable video queue).
//!
//! Uses `RenderJobStatus` from `models::status` for all status transitions.
//! No magic numbers — every status literal is a named constant.

use oneira_core::types::Id;
use sqlx::PgPool;

use crate::models::render_job::RenderJob;
use crate::models::status::RenderJobStatus;

/// Column list for `render_jobs` queries.
const COLUMNS: &str = "\
    id, story_node_id, user_id, status_id, error_message, attempts, \
    submitted_at, claimed_at, completed_at";

/// Provides queue operations for background render jobs.
pub struct RenderJobRepo;

impl RenderJobRepo {
    /// Enqueue a render job for a node.
    ///
    /// The partial unique index on active jobs makes this at-most-once
    /// while a pending or running job exists for the node: a duplicate
    /// submission returns `None` instead of a second job.
    pub async fn submit(
        pool: &PgPool,
        story_node_id: Id,
        user_id: Id,
    ) -> Result<Option<RenderJob>, sqlx::Error> {
        // The conflict-target predicate must be a literal expression for
        // Postgres to match it against the partial index, so the status ids
        // are formatted in rather than bound.
        let query = format!(
            "INSERT INTO render_jobs (story_node_id, user_id, status_id) \
             VALUES ($1, $2, $3) \
             ON CONFLICT (story_node_id) WHERE status_id IN ({pending}, {running}) DO NOTHING \
             RETURNING {COLUMNS}",
            pending = RenderJobStatus::Pending.id(),
            running = RenderJobStatus::Running.id(),
        );
        sqlx::query_as::<_, RenderJob>(&query)
            .bind(story_node_id)
            .bind(user_id)
            .bind(RenderJobStatus::Pending.id())
            .fetch_optional(pool)
            .await
    }

    /// Atomically claim the oldest pending job.
    ///
    /// Uses `SELECT FOR UPDATE SKIP LOCKED` so concurrent dispatchers
    /// (the API process and any standalone workers) never double-claim.
    pub async fn claim_next(pool: &PgPool) -> Result<Option<RenderJob>, sqlx::Error> {
        let query = format!(
            "UPDATE render_jobs \
             SET status_id = $1, claimed_at = NOW(), attempts = attempts + 1 \
             WHERE id = ( \
                 SELECT id FROM render_jobs \
                 WHERE status_id = $2 \
                 ORDER BY submitted_at ASC \
                 LIMIT 1 \
                 FOR UPDATE SKIP LOCKED \
             ) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, RenderJob>(&query)
            .bind(RenderJobStatus::Running.id())
            .bind(RenderJobStatus::Pending.id())
            .fetch_optional(pool)
            .await
    }

    /// Mark a job as completed.
    pub async fn complete(pool: &PgPool, job_id: Id) -> Result<(), sqlx::Error> {
        sqlx::query(
            "UPDATE render_jobs SET status_id = $2, completed_at = NOW() WHERE id = $1",
        )
        .bind(job_id)
        .bind(RenderJobStatus::Completed.id())
        .execute(pool)
        .await?;
        Ok(())
    }

    /// Mark a job as failed with its error message.
    ///
    /// The failure stays on the row — a later `submit` for the same node is
    /// allowed once no active job remains, which is how a render is retried.
    pub async fn fail(pool: &PgPool, job_id: Id, error: &str) -> Result<(), sqlx::Error> {
        sqlx::query(
            "UPDATE render_jobs \
             SET status_id = $2, error_message = $3, completed_at = NOW() \
             WHERE id = $1",
        )
        .bind(job_id)
        .bind(RenderJobStatus::Failed.id())
        .bind(error)
        .execute(pool)
        .await?;
        Ok(())
    }

    /// Find a job by its ID.
    pub async fn find_by_id(pool: &PgPool, id: Id) -> Result<Option<RenderJob>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM render_jobs WHERE id = $1");
        sqlx::query_as::<_, RenderJob>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }
}
