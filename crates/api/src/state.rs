use std::sync::Arc;

use oneira_pipeline::{DreamPipeline, Renderer};

use crate::auth::identity::IdentityClient;
use crate::config::ServerConfig;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// This is cheaply cloneable (inner data is behind `Arc` or is already `Clone`).
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool.
    pub pool: oneira_db::DbPool,
    /// Server configuration.
    pub config: Arc<ServerConfig>,
    /// Client for the external identity service (bearer-token checks).
    pub identity: Arc<IdentityClient>,
    /// The synchronous dream pipeline (transcribe, generate, persist).
    pub pipeline: Arc<DreamPipeline>,
    /// The render task, exposed synchronously by `generate-video` and
    /// driven asynchronously by the dispatcher.
    pub renderer: Arc<Renderer>,
}
