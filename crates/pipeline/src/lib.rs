//! The dream media-generation pipeline.
//!
//! Sequencing lives here: the orchestrator runs transcription, narrative
//! generation, and persistence synchronously, then enqueues a durable
//! render job; the dispatcher claims queued jobs and drives the render
//! task (generate, download, signed upload, compare-and-set).

pub mod dispatcher;
pub mod narrative;
pub mod orchestrator;
pub mod render;
pub mod store;

pub use dispatcher::RenderDispatcher;
pub use orchestrator::{
    AudioInput, DreamPipeline, PipelineError, ProcessDreamInput, ProcessedDream, VideoStatus,
};
pub use render::{RenderError, RenderOutcome, Renderer};
pub use store::StoreError;
