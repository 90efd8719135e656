//! Bounded polling for render readiness.
//!
//! The server never pushes completion; callers poll. The loop is strictly
//! bounded: a fixed interval between attempts and a fixed attempt ceiling,
//! so it returns within `max_attempts × interval` wall-clock time in every
//! case — ready, vanished, or timed out.

use std::time::Duration;

use async_trait::async_trait;
use oneira_core::types::Id;

/// Wait between polls.
pub const POLL_INTERVAL: Duration = Duration::from_secs(5);

/// Attempt ceiling: 24 polls at 5 s ≈ 2 minutes.
pub const MAX_ATTEMPTS: u32 = 24;

/// One status answer from the server.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusReport {
    pub video_url: Option<String>,
    pub status: VideoReadiness,
}

/// Render readiness as the polling contract reports it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VideoReadiness {
    Ready,
    Pending,
    NotFound,
}

/// Anything that can answer "is this node's video ready?".
///
/// The HTTP client implements this; tests substitute scripted sources.
#[async_trait]
pub trait StatusSource {
    /// The source's transport error type.
    type Error: std::error::Error + Send + Sync + 'static;

    /// Fetch the current status of a node.
    async fn fetch_status(&self, node_id: Id) -> Result<StatusReport, Self::Error>;
}

/// Why a poll ended without a URL.
#[derive(Debug, thiserror::Error)]
pub enum PollError<E> {
    /// The node disappeared (or never existed); retrying is pointless.
    #[error("StoryNode {0} not found")]
    NotFound(Id),

    /// The underlying status fetch failed.
    #[error(transparent)]
    Source(E),
}

/// Polls a [`StatusSource`] until a node's video is ready or the attempt
/// budget runs out.
pub struct VideoPoller<S> {
    source: S,
    interval: Duration,
    max_attempts: u32,
}

impl<S: StatusSource> VideoPoller<S> {
    /// Create a poller with the standard interval and attempt ceiling.
    pub fn new(source: S) -> Self {
        Self::with_schedule(source, POLL_INTERVAL, MAX_ATTEMPTS)
    }

    /// Create a poller with an explicit schedule (used in tests).
    pub fn with_schedule(source: S, interval: Duration, max_attempts: u32) -> Self {
        Self {
            source,
            interval,
            max_attempts,
        }
    }

    /// Poll until the video is ready.
    ///
    /// Returns `Ok(Some(url))` when ready, `Ok(None)` when the attempt
    /// budget is exhausted while still pending (distinct from
    /// [`PollError::NotFound`]), and an error when the node is missing or
    /// the transport fails.
    pub async fn wait_for_video(&self, node_id: Id) -> Result<Option<String>, PollError<S::Error>> {
        for attempt in 1..=self.max_attempts {
            let report = self
                .source
                .fetch_status(node_id)
                .await
                .map_err(PollError::Source)?;

            match report.status {
                VideoReadiness::Ready => {
                    tracing::debug!(node_id = %node_id, attempt, "Video ready");
                    return Ok(report.video_url);
                }
                VideoReadiness::NotFound => {
                    return Err(PollError::NotFound(node_id));
                }
                VideoReadiness::Pending => {
                    if attempt < self.max_attempts {
                        tokio::time::sleep(self.interval).await;
                    }
                }
            }
        }

        tracing::debug!(node_id = %node_id, attempts = self.max_attempts, "Poll budget exhausted");
        Ok(None)
    }
}
