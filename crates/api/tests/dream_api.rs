//! Integration tests for the process-dream endpoint.
//!
//! The chat-completion upstream is stubbed with a fixed story; speech,
//! video generation, and object storage point at a dead endpoint, so any
//! unexpected use of them fails the request.

mod common;

use axum::http::StatusCode;
use common::{body_json, post_authed};
use serde_json::json;
use sqlx::PgPool;

// ---------------------------------------------------------------------------
// Happy path: text input
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../db/migrations")]
async fn text_input_returns_story_with_three_options(pool: PgPool) {
    let upstream = common::spawn_stub_upstream().await;
    let app = common::build_test_app(pool.clone(), &upstream);

    let response = post_authed(
        app,
        "/api/v1/process-dream",
        json!({
            "textInput": "I dreamed of flying over mountains",
            "generateVideo": false,
        }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;

    // The transcript is the literal input, verbatim.
    assert_eq!(body["transcript"], "I dreamed of flying over mountains");

    // Exactly 3 options, in generation order.
    let options = body["options"].as_array().unwrap();
    assert_eq!(options.len(), 3);
    for (option, expected) in options.iter().zip(common::STUB_STORY_OPTIONS) {
        assert_eq!(option["optionText"], expected);
        assert!(option["id"].is_string());
    }

    // The node carries the generated content and no video.
    assert_eq!(body["storyNode"]["content"], common::STUB_STORY_CONTENT);
    assert!(body["storyNode"].get("videoUrl").is_none());
    assert!(body["storyNode"]["createdAt"].is_string());

    // Rendering was disabled by the caller.
    assert_eq!(body["videoStatus"], "disabled");

    // Nothing was enqueued.
    let jobs: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM render_jobs")
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(jobs.0, 0);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn video_generation_defaults_to_enabled_and_enqueues_a_job(pool: PgPool) {
    let upstream = common::spawn_stub_upstream().await;
    let app = common::build_test_app(pool.clone(), &upstream);

    let response = post_authed(
        app,
        "/api/v1/process-dream",
        json!({ "textInput": "a short dream" }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    assert_eq!(body["videoStatus"], "generating");

    // The response returned before any rendering: the node has no video,
    // but a durable render job exists for it.
    let node_id: uuid::Uuid = body["storyNode"]["id"]
        .as_str()
        .unwrap()
        .parse()
        .unwrap();
    let jobs: (i64,) =
        sqlx::query_as("SELECT COUNT(*) FROM render_jobs WHERE story_node_id = $1")
            .bind(node_id)
            .fetch_one(&pool)
            .await
            .unwrap();
    assert_eq!(jobs.0, 1);
}

// ---------------------------------------------------------------------------
// Session continuation
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../db/migrations")]
async fn continuing_a_dream_reuses_the_session(pool: PgPool) {
    let upstream = common::spawn_stub_upstream().await;

    let first = post_authed(
        common::build_test_app(pool.clone(), &upstream),
        "/api/v1/process-dream",
        json!({ "textInput": "first entry", "generateVideo": false }),
    )
    .await;
    let first = body_json(first).await;
    let dream_id = first["dreamId"].as_str().unwrap().to_string();
    let node_id = first["storyNode"]["id"].as_str().unwrap().to_string();

    let second = post_authed(
        common::build_test_app(pool.clone(), &upstream),
        "/api/v1/process-dream",
        json!({
            "textInput": "second entry",
            "dreamId": dream_id,
            "parentNodeId": node_id,
            "generateVideo": false,
        }),
    )
    .await;
    assert_eq!(second.status(), StatusCode::OK);
    let second = body_json(second).await;

    assert_eq!(second["dreamId"], dream_id.as_str());

    // The session transcript was overwritten with the newest entry.
    let transcript: (String,) = sqlx::query_as("SELECT transcript FROM dreams WHERE id = $1")
        .bind(dream_id.parse::<uuid::Uuid>().unwrap())
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(transcript.0, "second entry");
}

#[sqlx::test(migrations = "../db/migrations")]
async fn unknown_dream_id_is_a_caller_error(pool: PgPool) {
    let upstream = common::spawn_stub_upstream().await;
    let app = common::build_test_app(pool, &upstream);

    let response = post_authed(
        app,
        "/api/v1/process-dream",
        json!({
            "textInput": "text",
            "dreamId": uuid::Uuid::new_v4(),
            "generateVideo": false,
        }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../db/migrations")]
async fn empty_body_is_rejected_with_an_error_field(pool: PgPool) {
    let upstream = common::spawn_stub_upstream().await;
    let app = common::build_test_app(pool, &upstream);

    let response = post_authed(app, "/api/v1/process-dream", json!({})).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let body = body_json(response).await;
    assert!(body["error"].is_string());
    assert_eq!(body["code"], "VALIDATION_ERROR");
}

#[sqlx::test(migrations = "../db/migrations")]
async fn audio_and_text_together_are_rejected(pool: PgPool) {
    let upstream = common::spawn_stub_upstream().await;
    let app = common::build_test_app(pool, &upstream);

    let response = post_authed(
        app,
        "/api/v1/process-dream",
        json!({
            "audioBase64": "AAAA",
            "audioMimeType": "audio/webm",
            "textInput": "also text",
        }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn audio_without_mime_type_is_rejected(pool: PgPool) {
    let upstream = common::spawn_stub_upstream().await;
    let app = common::build_test_app(pool, &upstream);

    let response = post_authed(
        app,
        "/api/v1/process-dream",
        json!({ "audioBase64": "AAAA" }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let body = body_json(response).await;
    assert!(body["error"]
        .as_str()
        .unwrap()
        .contains("audioMimeType"));
}

#[sqlx::test(migrations = "../db/migrations")]
async fn transcription_failure_aborts_before_generation(pool: PgPool) {
    let upstream = common::spawn_stub_upstream().await;
    let app = common::build_test_app(pool.clone(), &upstream);

    // The speech endpoint is dead, so the audio path fails upstream before
    // story generation or persistence can run.
    let response = post_authed(
        app,
        "/api/v1/process-dream",
        json!({
            "audioBase64": "AAAA",
            "audioMimeType": "audio/webm",
        }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_GATEWAY);

    let body = body_json(response).await;
    assert_eq!(body["code"], "UPSTREAM_ERROR");

    // Nothing was persisted.
    let dreams: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM dreams")
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(dreams.0, 0);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn invalid_base64_audio_is_rejected(pool: PgPool) {
    let upstream = common::spawn_stub_upstream().await;
    let app = common::build_test_app(pool, &upstream);

    let response = post_authed(
        app,
        "/api/v1/process-dream",
        json!({
            "audioBase64": "not//valid**base64",
            "audioMimeType": "audio/webm",
        }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}
