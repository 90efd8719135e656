//! Story option entity model.

use oneira_core::types::Id;
use serde::Serialize;
use sqlx::FromRow;

/// A row from the `story_options` table: one suggested continuation.
///
/// `next_node_id` is populated only when the user acts on the option and a
/// follow-on node is generated from it.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct StoryOption {
    pub id: Id,
    pub story_node_id: Id,
    pub option_text: String,
    pub next_node_id: Option<Id>,
}
