//! Transactional writer for a dream session's narrative unit.
//!
//! A node and its options are created together or not at all: every insert
//! runs inside one transaction, and a failure at any stage rolls the whole
//! unit back. Errors name the stage that failed.

use oneira_core::types::Id;
use oneira_db::models::story_node::StoryNode;
use oneira_db::models::story_option::StoryOption;
use oneira_db::repositories::{DreamRepo, StoryNodeRepo, StoryOptionRepo};
use sqlx::PgPool;

/// Input for one persistence unit.
#[derive(Debug)]
pub struct SaveDreamArgs<'a> {
    pub user_id: Id,
    pub transcript: &'a str,
    pub content: &'a str,
    pub options: &'a [String],
    /// Already-rendered video URL, if the node arrives with one.
    pub video_url: Option<&'a str>,
    /// Continue this dream session instead of creating a new one.
    pub dream_id: Option<Id>,
    /// Branch from this node.
    pub parent_node_id: Option<Id>,
}

/// The hydrated result of a committed persistence unit.
#[derive(Debug)]
pub struct SavedSession {
    pub dream_id: Id,
    pub node: StoryNode,
    pub options: Vec<StoryOption>,
}

/// A persistence failure, naming the stage that failed.
///
/// Whatever stage fails, the transaction is rolled back — no partial
/// dream/node/option writes survive.
#[derive(Debug, thiserror::Error)]
#[error("store write failed at '{stage}': {source}")]
pub struct StoreError {
    pub stage: &'static str,
    #[source]
    pub source: sqlx::Error,
}

fn at(stage: &'static str) -> impl FnOnce(sqlx::Error) -> StoreError {
    move |source| StoreError { stage, source }
}

/// Persist a dream session increment: the dream row (created or its
/// transcript refreshed), one story node, and its option set.
pub async fn save_dream_session(
    pool: &PgPool,
    args: SaveDreamArgs<'_>,
) -> Result<SavedSession, StoreError> {
    let mut tx = pool.begin().await.map_err(at("begin transaction"))?;

    let dream_id = match args.dream_id {
        None => {
            DreamRepo::create(&mut *tx, args.user_id, args.transcript)
                .await
                .map_err(at("create dream"))?
                .id
        }
        Some(id) => {
            let updated = DreamRepo::update_transcript(&mut *tx, id, args.transcript)
                .await
                .map_err(at("update dream transcript"))?;
            if !updated {
                return Err(StoreError {
                    stage: "update dream transcript",
                    source: sqlx::Error::RowNotFound,
                });
            }
            id
        }
    };

    let node = StoryNodeRepo::create(
        &mut *tx,
        dream_id,
        args.parent_node_id,
        args.content,
        args.video_url,
    )
    .await
    .map_err(at("create story node"))?;

    let options = StoryOptionRepo::create_batch(&mut *tx, node.id, args.options)
        .await
        .map_err(at("create story options"))?;

    tx.commit().await.map_err(at("commit"))?;

    tracing::info!(
        dream_id = %dream_id,
        node_id = %node.id,
        options = options.len(),
        "Dream session increment persisted",
    );

    Ok(SavedSession {
        dream_id,
        node,
        options,
    })
}
