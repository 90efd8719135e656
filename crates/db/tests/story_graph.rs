//! Integration tests for the dream / story node / story option repositories.

use oneira_db::repositories::{DreamRepo, StoryNodeRepo, StoryOptionRepo};
use sqlx::PgPool;
use uuid::Uuid;

// ---------------------------------------------------------------------------
// Dream sessions
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "./migrations")]
async fn create_and_update_dream(pool: PgPool) {
    let user_id = Uuid::new_v4();

    let dream = DreamRepo::create(&pool, user_id, "first transcript")
        .await
        .unwrap();
    assert_eq!(dream.user_id, user_id);
    assert_eq!(dream.transcript, "first transcript");

    let updated = DreamRepo::update_transcript(&pool, dream.id, "second transcript")
        .await
        .unwrap();
    assert!(updated);

    let reloaded = DreamRepo::find_by_id(&pool, dream.id).await.unwrap().unwrap();
    assert_eq!(reloaded.transcript, "second transcript");
}

#[sqlx::test(migrations = "./migrations")]
async fn update_transcript_on_unknown_dream_affects_nothing(pool: PgPool) {
    let updated = DreamRepo::update_transcript(&pool, Uuid::new_v4(), "text")
        .await
        .unwrap();
    assert!(!updated);
}

// ---------------------------------------------------------------------------
// Story nodes and options
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "./migrations")]
async fn node_and_options_round_trip(pool: PgPool) {
    let dream = DreamRepo::create(&pool, Uuid::new_v4(), "t").await.unwrap();
    let node = StoryNodeRepo::create(&pool, dream.id, None, "a silver forest", None)
        .await
        .unwrap();
    assert_eq!(node.dream_id, dream.id);
    assert!(node.video_url.is_none());
    assert!(node.parent_node_id.is_none());

    let texts = vec![
        "Climb the tallest tree.".to_string(),
        "Follow the river of light.".to_string(),
        "Wake up.".to_string(),
    ];
    let options = StoryOptionRepo::create_batch(&pool, node.id, &texts)
        .await
        .unwrap();
    assert_eq!(options.len(), 3);
    assert!(options.iter().all(|o| o.next_node_id.is_none()));

    // Reads come back in generation order.
    let listed = StoryOptionRepo::list_by_node(&pool, node.id).await.unwrap();
    let listed_texts: Vec<&str> = listed.iter().map(|o| o.option_text.as_str()).collect();
    assert_eq!(
        listed_texts,
        vec![
            "Climb the tallest tree.",
            "Follow the river of light.",
            "Wake up.",
        ]
    );
}

#[sqlx::test(migrations = "./migrations")]
async fn list_content_preserves_session_order(pool: PgPool) {
    let dream = DreamRepo::create(&pool, Uuid::new_v4(), "t").await.unwrap();
    let first = StoryNodeRepo::create(&pool, dream.id, None, "chapter one", None)
        .await
        .unwrap();
    StoryNodeRepo::create(&pool, dream.id, Some(first.id), "chapter two", None)
        .await
        .unwrap();

    let contents = StoryNodeRepo::list_content_for_dream(&pool, dream.id)
        .await
        .unwrap();
    assert_eq!(contents, vec!["chapter one", "chapter two"]);
}

#[sqlx::test(migrations = "./migrations")]
async fn find_with_owner_joins_the_dream(pool: PgPool) {
    let user_id = Uuid::new_v4();
    let dream = DreamRepo::create(&pool, user_id, "t").await.unwrap();
    let node = StoryNodeRepo::create(&pool, dream.id, None, "content", None)
        .await
        .unwrap();

    let with_owner = StoryNodeRepo::find_with_owner(&pool, node.id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(with_owner.user_id, user_id);
    assert_eq!(with_owner.dream_id, dream.id);
    assert_eq!(with_owner.content, "content");
}

// ---------------------------------------------------------------------------
// Video URL compare-and-set: first writer wins
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "./migrations")]
async fn video_url_first_writer_wins(pool: PgPool) {
    let dream = DreamRepo::create(&pool, Uuid::new_v4(), "t").await.unwrap();
    let node = StoryNodeRepo::create(&pool, dream.id, None, "content", None)
        .await
        .unwrap();

    let won = StoryNodeRepo::set_video_url_if_absent(&pool, node.id, "https://cdn/a.mp4")
        .await
        .unwrap();
    assert!(won);

    let lost = StoryNodeRepo::set_video_url_if_absent(&pool, node.id, "https://cdn/b.mp4")
        .await
        .unwrap();
    assert!(!lost, "second writer must not overwrite");

    let reloaded = StoryNodeRepo::find_by_id(&pool, node.id).await.unwrap().unwrap();
    assert_eq!(reloaded.video_url.as_deref(), Some("https://cdn/a.mp4"));
}

// ---------------------------------------------------------------------------
// Rendered-node listing (random-video source)
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "./migrations")]
async fn list_recent_rendered_filters_and_limits(pool: PgPool) {
    let dream = DreamRepo::create(&pool, Uuid::new_v4(), "t").await.unwrap();

    // One unrendered node and three rendered ones.
    StoryNodeRepo::create(&pool, dream.id, None, "no video", None)
        .await
        .unwrap();
    for i in 0..3 {
        let content = format!("rendered {i}");
        let url = format!("https://cdn/{i}.mp4");
        StoryNodeRepo::create(&pool, dream.id, None, &content, Some(url.as_str()))
            .await
            .unwrap();
    }

    let rendered = StoryNodeRepo::list_recent_rendered(&pool, 2).await.unwrap();
    assert_eq!(rendered.len(), 2);
    assert!(rendered.iter().all(|n| n.video_url.starts_with("https://cdn/")));
}
