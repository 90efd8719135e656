pub mod dream;
pub mod health;
pub mod video;

use axum::Router;

use crate::state::AppState;

/// Build the `/api/v1` route tree.
///
/// Route hierarchy:
///
/// ```text
/// /process-dream        POST       run one dream increment (auth)
///
/// /generate-video       POST       render a node's video synchronously (auth)
/// /check-video-status   GET, POST  poll render readiness (auth)
/// /get-random-video     GET        random rendered clip (public)
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        // Dream ingestion pipeline.
        .merge(dream::router())
        // Video rendering, polling, and the public random pick.
        .merge(video::router())
}
