//! Route definitions for the video endpoints.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::video;
use crate::state::AppState;

/// Routes mounted at the API root.
///
/// ```text
/// POST      /generate-video       -> generate_video
/// GET|POST  /check-video-status   -> check_video_status_{get,post}
/// GET       /get-random-video     -> get_random_video (public)
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/generate-video", post(video::generate_video))
        .route(
            "/check-video-status",
            get(video::check_video_status_get).post(video::check_video_status_post),
        )
        .route("/get-random-video", get(video::get_random_video))
}
