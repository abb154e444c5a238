//! In-memory Object Store that records uploads and can be switched to fail.

use crate::storage::{public_url, ObjectStore, StorageError};
use async_trait::async_trait;
use axum::body::Bytes;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::RwLock;

/// One accepted upload.
#[derive(Clone, Debug)]
pub struct StoredObject {
    pub bucket: String,
    pub path: String,
    pub content_type: String,
    pub bytes: Bytes,
}

pub struct MemoryObjectStore {
    public_url: String,
    objects: RwLock<Vec<StoredObject>>,
    failing: AtomicBool,
}

impl MemoryObjectStore {
    pub fn new(public_url: impl Into<String>) -> Self {
        MemoryObjectStore {
            public_url: public_url.into(),
            objects: RwLock::new(Vec::new()),
            failing: AtomicBool::new(false),
        }
    }

    /// Reject every subsequent upload while `failing` is true.
    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    pub fn objects(&self) -> Vec<StoredObject> {
        self.objects.read().map(|o| o.clone()).unwrap_or_default()
    }
}

#[async_trait]
impl ObjectStore for MemoryObjectStore {
    async fn upload(&self, bucket: &str, path: &str, bytes: Bytes, content_type: &str) -> Result<String, StorageError> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(StorageError::Rejected(format!("bucket {} unavailable", bucket)));
        }
        let mut objects = self
            .objects
            .write()
            .map_err(|_| StorageError::Client("memory store lock poisoned".into()))?;
        if objects.iter().any(|o| o.bucket == bucket && o.path == path) {
            return Err(StorageError::Rejected(format!("{}/{} already exists", bucket, path)));
        }
        objects.push(StoredObject {
            bucket: bucket.to_string(),
            path: path.to_string(),
            content_type: content_type.to_string(),
            bytes,
        });
        Ok(public_url(&self.public_url, bucket, path))
    }
}
