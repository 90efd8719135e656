//! Dream session entity model.

use oneira_core::types::{Id, Timestamp};
use serde::Serialize;
use sqlx::FromRow;

/// A row from the `dreams` table: one ingestion session.
///
/// The transcript always holds the most recent recording of the session;
/// continuing a dream with new audio overwrites it.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Dream {
    pub id: Id,
    pub user_id: Id,
    pub transcript: String,
    pub created_at: Timestamp,
}
