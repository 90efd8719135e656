//! Signed uploads to an S3-compatible object store.
//!
//! The request signature is computed by hand ([`sigv4`]) rather than via a
//! vendor SDK; [`client::ObjectStore`] is the only consumer of the signer,
//! so callers never touch the algorithm.

pub mod client;
pub mod sigv4;

pub use client::{ObjectStore, StorageConfig, UploadError};
