//! Object Store: bucket-scoped uploads that return a public URL.

pub mod memory;
pub mod s3;

use async_trait::async_trait;
use axum::body::Bytes;
use thiserror::Error;

pub use memory::MemoryObjectStore;
pub use s3::S3ObjectStore;

#[derive(Error, Debug)]
pub enum StorageError {
    #[error("storage client: {0}")]
    Client(String),
    #[error("upload rejected: {0}")]
    Rejected(String),
}

#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Store `bytes` at `bucket/path` and return the object's public URL.
    async fn upload(&self, bucket: &str, path: &str, bytes: Bytes, content_type: &str) -> Result<String, StorageError>;
}

/// `<base>/<bucket>/<path>`, tolerating a trailing slash on the base.
pub fn public_url(base: &str, bucket: &str, path: &str) -> String {
    format!("{}/{}/{}", base.trim_end_matches('/'), bucket, path.trim_start_matches('/'))
}
