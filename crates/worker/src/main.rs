//! Standalone render worker.
//!
//! Runs the render dispatcher loop against the shared database queue.
//! Safe to run alongside the API process (and other workers): job
//! claiming uses `FOR UPDATE SKIP LOCKED`.

use std::sync::Arc;

use tokio_util::sync::CancellationToken;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use oneira_pipeline::{RenderDispatcher, Renderer};
use oneira_providers::VideoGenClient;
use oneira_storage::{ObjectStore, StorageConfig};

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "oneira_worker=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let database_url = std::env::var("DATABASE_URL").expect("DATABASE_URL must be set");
    let pool = oneira_db::create_pool(&database_url)
        .await
        .expect("Failed to connect to database");
    oneira_db::health_check(&pool)
        .await
        .expect("Database health check failed");
    tracing::info!("Database connection established");

    let videogen_api_key = std::env::var("FAL_API_KEY").expect("FAL_API_KEY must be set");
    let renderer = Arc::new(Renderer::new(
        pool.clone(),
        VideoGenClient::new(videogen_api_key),
        ObjectStore::new(StorageConfig::from_env()),
    ));

    let cancel = CancellationToken::new();
    let dispatcher = RenderDispatcher::new(pool, renderer);

    let signal_cancel = cancel.clone();
    tokio::spawn(async move {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl-C handler");
        tracing::info!("Received SIGINT, stopping dispatcher");
        signal_cancel.cancel();
    });

    tracing::info!("Render worker started");
    dispatcher.run(cancel).await;
    tracing::info!("Render worker stopped");
}
