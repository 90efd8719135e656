//! Integration tests for the transactional store writer.

use oneira_db::repositories::{DreamRepo, StoryOptionRepo};
use oneira_pipeline::store::{save_dream_session, SaveDreamArgs};
use sqlx::PgPool;
use uuid::Uuid;

fn three_options() -> Vec<String> {
    vec![
        "Open the door.".to_string(),
        "Turn back.".to_string(),
        "Call out.".to_string(),
    ]
}

#[sqlx::test(migrations = "../db/migrations")]
async fn creates_dream_node_and_options_together(pool: PgPool) {
    let user_id = Uuid::new_v4();

    let saved = save_dream_session(
        &pool,
        SaveDreamArgs {
            user_id,
            transcript: "I dreamed of a locked door",
            content: "The door hums softly.",
            options: &three_options(),
            video_url: None,
            dream_id: None,
            parent_node_id: None,
        },
    )
    .await
    .unwrap();

    let dream = DreamRepo::find_by_id(&pool, saved.dream_id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(dream.user_id, user_id);
    assert_eq!(dream.transcript, "I dreamed of a locked door");

    assert_eq!(saved.node.dream_id, saved.dream_id);
    assert_eq!(saved.node.content, "The door hums softly.");
    assert!(saved.node.video_url.is_none());
    assert_eq!(saved.options.len(), 3);

    let listed = StoryOptionRepo::list_by_node(&pool, saved.node.id)
        .await
        .unwrap();
    assert_eq!(listed.len(), 3);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn continuing_a_session_updates_the_transcript(pool: PgPool) {
    let user_id = Uuid::new_v4();

    let first = save_dream_session(
        &pool,
        SaveDreamArgs {
            user_id,
            transcript: "first recording",
            content: "chapter one",
            options: &three_options(),
            video_url: None,
            dream_id: None,
            parent_node_id: None,
        },
    )
    .await
    .unwrap();

    let second = save_dream_session(
        &pool,
        SaveDreamArgs {
            user_id,
            transcript: "second recording",
            content: "chapter two",
            options: &three_options(),
            video_url: None,
            dream_id: Some(first.dream_id),
            parent_node_id: Some(first.node.id),
        },
    )
    .await
    .unwrap();

    assert_eq!(second.dream_id, first.dream_id);
    assert_eq!(second.node.parent_node_id, Some(first.node.id));

    let dream = DreamRepo::find_by_id(&pool, first.dream_id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(dream.transcript, "second recording");
}

#[sqlx::test(migrations = "../db/migrations")]
async fn unknown_dream_id_fails_with_the_stage_name(pool: PgPool) {
    let err = save_dream_session(
        &pool,
        SaveDreamArgs {
            user_id: Uuid::new_v4(),
            transcript: "t",
            content: "c",
            options: &three_options(),
            video_url: None,
            dream_id: Some(Uuid::new_v4()),
            parent_node_id: None,
        },
    )
    .await
    .unwrap_err();

    assert_eq!(err.stage, "update dream transcript");
}

#[sqlx::test(migrations = "../db/migrations")]
async fn failed_unit_leaves_no_partial_writes(pool: PgPool) {
    // A nonexistent parent node violates the FK on story_nodes, after the
    // dream insert has already run inside the transaction.
    let err = save_dream_session(
        &pool,
        SaveDreamArgs {
            user_id: Uuid::new_v4(),
            transcript: "t",
            content: "c",
            options: &three_options(),
            video_url: None,
            dream_id: None,
            parent_node_id: Some(Uuid::new_v4()),
        },
    )
    .await
    .unwrap_err();
    assert_eq!(err.stage, "create story node");

    // The dream created earlier in the unit must have been rolled back.
    let dreams: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM dreams")
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(dreams.0, 0);

    let nodes: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM story_nodes")
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(nodes.0, 0);
}
