#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;

use axum::body::Body;
use axum::http::header::{AUTHORIZATION, CONTENT_TYPE};
use axum::http::{HeaderName, Method, Request, StatusCode};
use axum::response::Response;
use axum::routing::{get, post};
use axum::{Json, Router};
use http_body_util::BodyExt;
use serde_json::{json, Value};
use sqlx::PgPool;
use tower::ServiceExt;
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::cors::{Any, CorsLayer};
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer};
use tracing::Level;
use uuid::Uuid;

use oneira_api::auth::identity::IdentityClient;
use oneira_api::config::ServerConfig;
use oneira_api::routes;
use oneira_api::state::AppState;
use oneira_pipeline::{DreamPipeline, Renderer};
use oneira_providers::{SpeechClient, StoryClient, VideoGenClient};
use oneira_storage::{ObjectStore, StorageConfig};

/// The user id the stub identity service resolves every bearer token to.
pub const TEST_USER_ID: Uuid = Uuid::from_u128(0xa1b2_c3d4_e5f6_4a0b_8c0d_0e0f_1011_1213);

/// TCP port 9 (discard) — connections are refused immediately, so any
/// accidental call to an un-stubbed service fails loudly.
pub const DEAD_ENDPOINT: &str = "http://127.0.0.1:9";

/// The narrative the stub chat-completion service always returns.
pub const STUB_STORY_CONTENT: &str = "A vivid dream unfolds across a violet sky.";

/// The three options the stub chat-completion service always returns.
pub const STUB_STORY_OPTIONS: [&str; 3] =
    ["Drift higher.", "Dive into the sea of clouds.", "Wake up."];

async fn stub_user() -> Json<Value> {
    Json(json!({ "id": TEST_USER_ID }))
}

async fn stub_chat_completion() -> Json<Value> {
    let story = json!({
        "content": STUB_STORY_CONTENT,
        "options": STUB_STORY_OPTIONS,
    });
    Json(json!({
        "choices": [
            { "message": { "content": story.to_string() } }
        ]
    }))
}

/// Spawn a stub for the upstream services the tests exercise (identity
/// verification and chat completion) on an ephemeral local port, and
/// return its base URL.
pub async fn spawn_stub_upstream() -> String {
    let app = Router::new()
        .route("/auth/v1/user", get(stub_user))
        .route("/v1/chat/completions", post(stub_chat_completion));

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    format!("http://{addr}")
}

/// Build a test `ServerConfig` pointing at the stub identity service.
pub fn test_config(identity_url: &str) -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        request_timeout_secs: 30,
        identity_url: identity_url.to_string(),
    }
}

fn test_storage_config() -> StorageConfig {
    StorageConfig {
        account_id: "acct".to_string(),
        access_key_id: "akid".to_string(),
        secret_access_key: "secret".to_string(),
        bucket: "bucket".to_string(),
        public_base_url: None,
    }
}

/// Build the full application router with all middleware layers, using the
/// given database pool and stub upstream.
///
/// This mirrors the router construction in `main.rs` so integration tests
/// exercise the same middleware stack (CORS, request ID, timeout, tracing,
/// panic recovery) that production uses. The speech, video-generation, and
/// object-store clients point at [`DEAD_ENDPOINT`]; only identity and chat
/// completion are stubbed for real.
pub fn build_test_app(pool: PgPool, upstream: &str) -> Router {
    let config = test_config(upstream);
    let identity = Arc::new(IdentityClient::new(upstream.to_string()));

    let speech = SpeechClient::with_base_url("test-key".to_string(), DEAD_ENDPOINT.to_string());
    let story = StoryClient::with_base_url("test-key".to_string(), upstream.to_string());
    let objects = ObjectStore::new(test_storage_config()).with_endpoint(DEAD_ENDPOINT.to_string());

    let pipeline = Arc::new(DreamPipeline::new(
        pool.clone(),
        speech,
        story,
        None,
        objects,
    ));

    let renderer = Arc::new(Renderer::new(
        pool.clone(),
        VideoGenClient::with_base_url("test-key".to_string(), DEAD_ENDPOINT.to_string()),
        ObjectStore::new(test_storage_config()).with_endpoint(DEAD_ENDPOINT.to_string()),
    ));

    let state = AppState {
        pool,
        config: Arc::new(config),
        identity,
        pipeline,
        renderer,
    };

    let request_id_header = HeaderName::from_static("x-request-id");

    Router::new()
        .merge(routes::health::router())
        .nest("/api/v1", routes::api_routes())
        .layer(CatchPanicLayer::new())
        .layer(TimeoutLayer::with_status_code(
            StatusCode::REQUEST_TIMEOUT,
            Duration::from_secs(30),
        ))
        .layer(PropagateRequestIdLayer::new(request_id_header.clone()))
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .layer(SetRequestIdLayer::new(request_id_header, MakeRequestUuid))
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state)
}

// ---------------------------------------------------------------------------
// Request helpers
// ---------------------------------------------------------------------------

/// GET without credentials.
pub async fn get_plain(app: Router, uri: &str) -> Response {
    app.oneshot(
        Request::builder()
            .method(Method::GET)
            .uri(uri)
            .body(Body::empty())
            .unwrap(),
    )
    .await
    .unwrap()
}

/// GET with a bearer token the stub identity service accepts.
pub async fn get_authed(app: Router, uri: &str) -> Response {
    app.oneshot(
        Request::builder()
            .method(Method::GET)
            .uri(uri)
            .header(AUTHORIZATION, "Bearer test-token")
            .body(Body::empty())
            .unwrap(),
    )
    .await
    .unwrap()
}

/// POST a JSON body without credentials.
pub async fn post_plain(app: Router, uri: &str, body: Value) -> Response {
    app.oneshot(
        Request::builder()
            .method(Method::POST)
            .uri(uri)
            .header(CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
    )
    .await
    .unwrap()
}

/// POST a JSON body with a bearer token the stub identity service accepts.
pub async fn post_authed(app: Router, uri: &str, body: Value) -> Response {
    app.oneshot(
        Request::builder()
            .method(Method::POST)
            .uri(uri)
            .header(AUTHORIZATION, "Bearer test-token")
            .header(CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
    )
    .await
    .unwrap()
}

/// Collect a response body into JSON.
pub async fn body_json(response: Response) -> Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}
