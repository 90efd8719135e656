//! Caller-side library for the Oneira API.
//!
//! [`api::ApiClient`] wraps the HTTP surface; [`poller::VideoPoller`]
//! implements the bounded polling contract for render readiness on top of
//! any [`poller::StatusSource`].

pub mod api;
pub mod poller;

pub use api::{ApiClient, ApiError};
pub use poller::{PollError, StatusReport, StatusSource, VideoPoller, VideoReadiness};
