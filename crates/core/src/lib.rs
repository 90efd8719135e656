//! Shared domain types, errors, and pure helpers for the Oneira pipeline.
//!
//! This crate has no I/O and no internal dependencies so it can be used by
//! every layer: the database crate, the provider clients, the pipeline, the
//! API server, and the caller-side client library.

pub mod error;
pub mod prompt;
pub mod storage_keys;
pub mod types;
