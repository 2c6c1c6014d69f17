//! Object storage for uploaded news media.
//!
//! Handlers and services depend on the [`ObjectStorage`] trait; production
//! wires [`MinIOClient`], tests use an in-memory store.

mod minio_client;

use async_trait::async_trait;

use crate::core::error::Result;

pub use minio_client::MinIOClient;

#[async_trait]
pub trait ObjectStorage: Send + Sync {
    /// Store `data` under `path` in the publicly readable area and return the
    /// URL clients should use to fetch it.
    async fn put_public(&self, path: &str, data: Vec<u8>, content_type: &str) -> Result<String>;
}
