//! Background render dispatcher.
//!
//! Polls the durable `render_jobs` queue and drives the render task for
//! each claimed job. Claiming uses `SELECT FOR UPDATE SKIP LOCKED`, so any
//! number of dispatchers (the API process plus standalone workers) can run
//! concurrently without double-rendering a job.

use std::sync::Arc;
use std::time::Duration;

use oneira_db::repositories::RenderJobRepo;
use sqlx::PgPool;
use tokio_util::sync::CancellationToken;

use crate::render::Renderer;

/// Default polling interval for the dispatcher loop.
const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(1);

/// A single long-lived task that matches queued render jobs with the
/// renderer.
pub struct RenderDispatcher {
    pool: PgPool,
    renderer: Arc<Renderer>,
    poll_interval: Duration,
}

impl RenderDispatcher {
    /// Create a dispatcher with the default 1-second poll interval.
    pub fn new(pool: PgPool, renderer: Arc<Renderer>) -> Self {
        Self {
            pool,
            renderer,
            poll_interval: DEFAULT_POLL_INTERVAL,
        }
    }

    /// Run the dispatcher loop until the cancellation token is triggered.
    pub async fn run(&self, cancel: CancellationToken) {
        let mut ticker = tokio::time::interval(self.poll_interval);
        tracing::info!(
            poll_interval_ms = self.poll_interval.as_millis() as u64,
            "Render dispatcher started",
        );

        loop {
            tokio::select! {
                _ = cancel.cancelled() => {
                    tracing::info!("Render dispatcher shutting down");
                    break;
                }
                _ = ticker.tick() => {
                    if let Err(e) = self.drain_queue().await {
                        tracing::error!(error = %e, "Dispatch cycle failed");
                    }
                }
            }
        }
    }

    /// One dispatch cycle: claim and execute jobs until the queue is empty.
    ///
    /// Job failures are recorded on the job row and logged; they never
    /// propagate to the request that enqueued the job.
    async fn drain_queue(&self) -> Result<(), sqlx::Error> {
        while let Some(job) = RenderJobRepo::claim_next(&self.pool).await? {
            tracing::info!(
                job_id = %job.id,
                node_id = %job.story_node_id,
                attempt = job.attempts,
                "Render job claimed",
            );

            match self.renderer.render_node(job.story_node_id).await {
                Ok(outcome) => {
                    RenderJobRepo::complete(&self.pool, job.id).await?;
                    tracing::info!(
                        job_id = %job.id,
                        node_id = %job.story_node_id,
                        video_url = outcome.video_url(),
                        "Render job completed",
                    );
                }
                Err(e) => {
                    tracing::error!(
                        job_id = %job.id,
                        node_id = %job.story_node_id,
                        error = %e,
                        "Render job failed",
                    );
                    RenderJobRepo::fail(&self.pool, job.id, &e.to_string()).await?;
                }
            }
        }
        Ok(())
    }
}
