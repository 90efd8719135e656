//! Route definitions for the dream ingestion endpoint.

use axum::routing::post;
use axum::Router;

use crate::handlers::dream;
use crate::state::AppState;

/// Routes mounted at the API root.
///
/// ```text
/// POST   /process-dream   -> process_dream
/// ```
pub fn router() -> Router<AppState> {
    Router::new().route("/process-dream", post(dream::process_dream))
}
