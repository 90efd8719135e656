//! Integration tests for the durable render job queue.

use oneira_db::models::status::RenderJobStatus;
use oneira_db::repositories::{DreamRepo, RenderJobRepo, StoryNodeRepo};
use sqlx::PgPool;
use uuid::Uuid;

async fn seed_node(pool: &PgPool) -> (uuid::Uuid, uuid::Uuid) {
    let user_id = Uuid::new_v4();
    let dream = DreamRepo::create(pool, user_id, "t").await.unwrap();
    let node = StoryNodeRepo::create(pool, dream.id, None, "content", None)
        .await
        .unwrap();
    (user_id, node.id)
}

#[sqlx::test(migrations = "./migrations")]
async fn submit_enqueues_a_pending_job(pool: PgPool) {
    let (user_id, node_id) = seed_node(&pool).await;

    let job = RenderJobRepo::submit(&pool, node_id, user_id)
        .await
        .unwrap()
        .expect("first submission should enqueue");

    assert_eq!(job.story_node_id, node_id);
    assert_eq!(job.user_id, user_id);
    assert_eq!(job.status_id, RenderJobStatus::Pending.id());
    assert_eq!(job.attempts, 0);
    assert!(job.claimed_at.is_none());
}

#[sqlx::test(migrations = "./migrations")]
async fn duplicate_submit_is_a_no_op_while_job_is_active(pool: PgPool) {
    let (user_id, node_id) = seed_node(&pool).await;

    RenderJobRepo::submit(&pool, node_id, user_id)
        .await
        .unwrap()
        .unwrap();
    let second = RenderJobRepo::submit(&pool, node_id, user_id).await.unwrap();
    assert!(second.is_none(), "active job must suppress a duplicate");

    // Still suppressed while the job is running.
    RenderJobRepo::claim_next(&pool).await.unwrap().unwrap();
    let third = RenderJobRepo::submit(&pool, node_id, user_id).await.unwrap();
    assert!(third.is_none());
}

#[sqlx::test(migrations = "./migrations")]
async fn claim_transitions_to_running_and_counts_attempts(pool: PgPool) {
    let (user_id, node_id) = seed_node(&pool).await;
    let submitted = RenderJobRepo::submit(&pool, node_id, user_id)
        .await
        .unwrap()
        .unwrap();

    let claimed = RenderJobRepo::claim_next(&pool).await.unwrap().unwrap();
    assert_eq!(claimed.id, submitted.id);
    assert_eq!(claimed.status_id, RenderJobStatus::Running.id());
    assert_eq!(claimed.attempts, 1);
    assert!(claimed.claimed_at.is_some());

    // Nothing left to claim.
    assert!(RenderJobRepo::claim_next(&pool).await.unwrap().is_none());
}

#[sqlx::test(migrations = "./migrations")]
async fn claim_on_empty_queue_returns_none(pool: PgPool) {
    assert!(RenderJobRepo::claim_next(&pool).await.unwrap().is_none());
}

#[sqlx::test(migrations = "./migrations")]
async fn complete_and_fail_record_terminal_state(pool: PgPool) {
    let (user_id, node_id) = seed_node(&pool).await;
    RenderJobRepo::submit(&pool, node_id, user_id)
        .await
        .unwrap()
        .unwrap();
    let job = RenderJobRepo::claim_next(&pool).await.unwrap().unwrap();

    RenderJobRepo::fail(&pool, job.id, "generation service unreachable")
        .await
        .unwrap();

    let failed = RenderJobRepo::find_by_id(&pool, job.id).await.unwrap().unwrap();
    assert_eq!(failed.status_id, RenderJobStatus::Failed.id());
    assert_eq!(
        failed.error_message.as_deref(),
        Some("generation service unreachable")
    );
    assert!(failed.completed_at.is_some());

    // A failed job releases the node for a fresh submission (the retry path).
    let retry = RenderJobRepo::submit(&pool, node_id, user_id)
        .await
        .unwrap()
        .expect("retry after failure should enqueue");
    let claimed = RenderJobRepo::claim_next(&pool).await.unwrap().unwrap();
    assert_eq!(claimed.id, retry.id);

    RenderJobRepo::complete(&pool, claimed.id).await.unwrap();
    let completed = RenderJobRepo::find_by_id(&pool, claimed.id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(completed.status_id, RenderJobStatus::Completed.id());
    assert!(completed.error_message.is_none());
}

#[sqlx::test(migrations = "./migrations")]
async fn claim_order_is_oldest_first(pool: PgPool) {
    let (user_a, node_a) = seed_node(&pool).await;
    let (user_b, node_b) = seed_node(&pool).await;

    let first = RenderJobRepo::submit(&pool, node_a, user_a)
        .await
        .unwrap()
        .unwrap();
    // Force distinct submitted_at ordering regardless of clock resolution.
    sqlx::query("UPDATE render_jobs SET submitted_at = submitted_at - INTERVAL '1 second' WHERE id = $1")
        .bind(first.id)
        .execute(&pool)
        .await
        .unwrap();
    RenderJobRepo::submit(&pool, node_b, user_b)
        .await
        .unwrap()
        .unwrap();

    let claimed = RenderJobRepo::claim_next(&pool).await.unwrap().unwrap();
    assert_eq!(claimed.id, first.id);
}
