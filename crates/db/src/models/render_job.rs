//! Render job entity model for the durable video queue.

use oneira_core::types::{Id, Timestamp};
use serde::Serialize;
use sqlx::FromRow;

use super::status::StatusId;

/// A row from the `render_jobs` table.
///
/// One unit of background video work for a story node. A partial unique
/// index keeps at most one pending-or-running job per node; finished jobs
/// remain as an audit trail, with failures carrying `error_message`.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct RenderJob {
    pub id: Id,
    pub story_node_id: Id,
    pub user_id: Id,
    pub status_id: StatusId,
    pub error_message: Option<String>,
    pub attempts: i32,
    pub submitted_at: Timestamp,
    pub claimed_at: Option<Timestamp>,
    pub completed_at: Option<Timestamp>,
}
