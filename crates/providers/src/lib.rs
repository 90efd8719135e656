//! HTTP clients for the upstream generation services.
//!
//! Each client wraps one external API behind a small typed surface:
//! speech-to-text ([`stt::SpeechClient`]), narrative chat completion
//! ([`story::StoryClient`]), the memory/context store
//! ([`memory::MemoryClient`]), and text-to-video generation
//! ([`video::VideoGenClient`]). Clients hold a shared [`reqwest::Client`]
//! and report failures through per-service error enums; no retry or
//! degradation policy lives here — that belongs to the pipeline.

pub mod memory;
pub mod story;
pub mod stt;
pub mod video;

mod util;

pub use memory::{MemoryClient, MemoryError};
pub use story::{StoryClient, StoryError};
pub use stt::{SpeechClient, SpeechError};
pub use video::{VideoGenClient, VideoGenError};
