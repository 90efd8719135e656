//! Handlers for the video endpoints: synchronous generation, status
//! polling, and the public random-video pick.

use axum::extract::{Query, State};
use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use axum::Json;
use oneira_core::error::CoreError;
use oneira_core::types::{Id, Timestamp};
use oneira_db::repositories::StoryNodeRepo;
use oneira_pipeline::RenderError;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::auth::AuthUser;
use crate::error::{AppError, AppResult};
use crate::state::AppState;

/// How many recent rendered nodes the random pick draws from.
const RANDOM_POOL_SIZE: i64 = 20;

/// Length of the content preview returned with a random video.
const PREVIEW_CHARS: usize = 100;

// ---------------------------------------------------------------------------
// generate-video
// ---------------------------------------------------------------------------

/// POST body for `generate-video`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateVideoRequest {
    pub story_node_id: Option<Id>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateVideoResponse {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub video_url: Option<String>,
    pub node_id: Id,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// POST /api/v1/generate-video
///
/// Runs the render task synchronously for one node. A node that already
/// has a video short-circuits: the stored URL comes back with
/// `message: "Video already exists"` and no generation or upload happens.
pub async fn generate_video(
    auth: AuthUser,
    State(state): State<AppState>,
    Json(body): Json<GenerateVideoRequest>,
) -> AppResult<(StatusCode, Json<GenerateVideoResponse>)> {
    let node_id = body.story_node_id.ok_or_else(|| {
        AppError::Core(CoreError::Validation("storyNodeId is required".into()))
    })?;

    tracing::info!(user_id = %auth.user_id, node_id = %node_id, "Generating video");

    match state.renderer.render_node(node_id).await {
        Ok(outcome) => {
            let message = outcome
                .already_existed()
                .then(|| "Video already exists".to_string());
            Ok((
                StatusCode::OK,
                Json(GenerateVideoResponse {
                    success: true,
                    video_url: Some(outcome.video_url().to_string()),
                    node_id,
                    message,
                    error: None,
                }),
            ))
        }
        Err(RenderError::NodeNotFound(id)) => Err(AppError::Core(CoreError::NotFound {
            entity: "StoryNode",
            id,
        })),
        Err(RenderError::Db(e)) => Err(AppError::Database(e)),
        Err(e) => {
            // Generation or upload failure: keep the endpoint's
            // `{success: false}` contract instead of the generic error body.
            tracing::error!(node_id = %node_id, error = %e, "Synchronous render failed");
            Ok((
                StatusCode::BAD_GATEWAY,
                Json(GenerateVideoResponse {
                    success: false,
                    video_url: None,
                    node_id,
                    message: None,
                    error: Some(e.to_string()),
                }),
            ))
        }
    }
}

// ---------------------------------------------------------------------------
// check-video-status
// ---------------------------------------------------------------------------

/// Render readiness as the polling contract reports it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum VideoReadiness {
    Ready,
    Pending,
    NotFound,
}

#[derive(Debug, Deserialize)]
pub struct StatusQuery {
    #[serde(rename = "nodeId")]
    pub node_id: Option<Id>,
}

/// POST body for `check-video-status`; accepts either field name.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusBody {
    pub story_node_id: Option<Id>,
    pub node_id: Option<Id>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusResponse {
    pub node_id: Id,
    pub video_url: Option<String>,
    pub status: VideoReadiness,
}

/// GET /api/v1/check-video-status?nodeId=...
pub async fn check_video_status_get(
    _auth: AuthUser,
    State(state): State<AppState>,
    Query(query): Query<StatusQuery>,
) -> AppResult<(StatusCode, Json<StatusResponse>)> {
    let node_id = query.node_id.ok_or_else(|| {
        AppError::Core(CoreError::Validation("nodeId is required".into()))
    })?;
    video_status(&state, node_id).await
}

/// POST /api/v1/check-video-status
pub async fn check_video_status_post(
    _auth: AuthUser,
    State(state): State<AppState>,
    Json(body): Json<StatusBody>,
) -> AppResult<(StatusCode, Json<StatusResponse>)> {
    let node_id = body.story_node_id.or(body.node_id).ok_or_else(|| {
        AppError::Core(CoreError::Validation("nodeId is required".into()))
    })?;
    video_status(&state, node_id).await
}

/// Shared lookup. A missing node answers 404 but keeps the status body so
/// pollers can distinguish `not_found` from transport errors.
async fn video_status(
    state: &AppState,
    node_id: Id,
) -> AppResult<(StatusCode, Json<StatusResponse>)> {
    let node = StoryNodeRepo::find_by_id(&state.pool, node_id).await?;

    let (status_code, response) = match node {
        None => (
            StatusCode::NOT_FOUND,
            StatusResponse {
                node_id,
                video_url: None,
                status: VideoReadiness::NotFound,
            },
        ),
        Some(node) => {
            let status = if node.video_url.is_some() {
                VideoReadiness::Ready
            } else {
                VideoReadiness::Pending
            };
            (
                StatusCode::OK,
                StatusResponse {
                    node_id,
                    video_url: node.video_url,
                    status,
                },
            )
        }
    };

    Ok((status_code, Json(response)))
}

// ---------------------------------------------------------------------------
// get-random-video
// ---------------------------------------------------------------------------

/// Response for the public random-video endpoint. Field names are
/// snake_case on the wire, matching its original consumers.
#[derive(Debug, Serialize)]
pub struct RandomVideoResponse {
    pub video_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub story_content: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_at: Option<Timestamp>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

/// GET /api/v1/get-random-video
///
/// Public (no auth): picks one of the [`RANDOM_POOL_SIZE`] most recently
/// rendered nodes, for use as a rotating background. Responses are marked
/// uncacheable so every request can rotate.
pub async fn get_random_video(
    State(state): State<AppState>,
) -> AppResult<impl IntoResponse> {
    let rendered = StoryNodeRepo::list_recent_rendered(&state.pool, RANDOM_POOL_SIZE).await?;

    let cache_headers = [(
        header::CACHE_CONTROL,
        "no-store, no-cache, must-revalidate, proxy-revalidate",
    )];

    if rendered.is_empty() {
        return Ok((
            cache_headers,
            Json(RandomVideoResponse {
                video_url: None,
                story_content: None,
                created_at: None,
                message: Some("No videos available yet".to_string()),
            }),
        ));
    }

    let pick = &rendered[rand::rng().random_range(0..rendered.len())];
    let preview: String = pick.content.chars().take(PREVIEW_CHARS).collect();

    Ok((
        cache_headers,
        Json(RandomVideoResponse {
            video_url: Some(pick.video_url.clone()),
            story_content: Some(preview),
            created_at: Some(pick.created_at),
            message: None,
        }),
    ))
}
