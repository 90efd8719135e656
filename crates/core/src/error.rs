//! Domain-level error taxonomy shared across the workspace.

use crate::types::Id;

/// Domain errors raised below the HTTP layer.
///
/// The API crate maps each variant onto an HTTP status: `NotFound` → 404,
/// `Validation` → 400, `Conflict` → 409, `Unauthorized` → 401,
/// `Upstream` → 502, `Internal` → 500.
#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    /// An entity lookup came up empty.
    #[error("{entity} with id {id} not found")]
    NotFound {
        /// Entity kind, e.g. `"StoryNode"`.
        entity: &'static str,
        /// The id that was looked up.
        id: Id,
    },

    /// The caller supplied invalid input.
    #[error("Validation error: {0}")]
    Validation(String),

    /// The request conflicts with current state.
    #[error("Conflict: {0}")]
    Conflict(String),

    /// Missing or invalid credentials.
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// An upstream service failed or returned garbage.
    #[error("{service} error: {message}")]
    Upstream {
        /// Which service failed, e.g. `"speech-to-text"`.
        service: &'static str,
        /// Sanitized description of the failure.
        message: String,
    },

    /// An unexpected internal failure.
    #[error("Internal error: {0}")]
    Internal(String),
}
