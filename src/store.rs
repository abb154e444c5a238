//! Record Store: table-scoped insert / select / update / delete of JSON records.

pub mod memory;
pub mod postgres;

use crate::config::ResolvedResource;
use async_trait::async_trait;
use std::fmt;
use thiserror::Error;

pub use memory::MemoryRecordStore;
pub use postgres::PgRecordStore;

/// A row as column name → value. Ids and column types belong to the store.
pub type Record = serde_json::Map<String, serde_json::Value>;

/// Primary key value parsed from the request path.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RecordId {
    Int(i64),
    Uuid(uuid::Uuid),
    Text(String),
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RecordId::Int(n) => write!(f, "{}", n),
            RecordId::Uuid(u) => write!(f, "{}", u),
            RecordId::Text(s) => f.write_str(s),
        }
    }
}

#[derive(Error, Debug)]
pub enum RecordStoreError {
    #[error("no row in {table} with id {id}")]
    NotFound { table: String, id: String },
    /// Message reported by the backend, passed through unchanged.
    #[error("{0}")]
    Backend(String),
}

impl RecordStoreError {
    pub fn not_found(resource: &ResolvedResource, id: &RecordId) -> Self {
        RecordStoreError::NotFound {
            table: resource.table_name.clone(),
            id: id.to_string(),
        }
    }
}

#[async_trait]
pub trait RecordStore: Send + Sync {
    /// Insert one record; returns the stored row(s) as the backend reports them.
    async fn insert(&self, resource: &ResolvedResource, record: Record) -> Result<Vec<Record>, RecordStoreError>;

    /// All rows, ascending by the resource sort column.
    async fn select_all(&self, resource: &ResolvedResource) -> Result<Vec<Record>, RecordStoreError>;

    async fn select_by_id(&self, resource: &ResolvedResource, id: &RecordId) -> Result<Record, RecordStoreError>;

    /// Write only the columns in `patch`. Empty result when no row has `id`.
    async fn update_by_id(
        &self,
        resource: &ResolvedResource,
        id: &RecordId,
        patch: Record,
    ) -> Result<Vec<Record>, RecordStoreError>;

    /// Remove the row, returning it. `NotFound` when no row has `id`.
    async fn delete_by_id(&self, resource: &ResolvedResource, id: &RecordId) -> Result<Vec<Record>, RecordStoreError>;

    /// Connectivity check for readiness probes.
    async fn ping(&self) -> Result<(), RecordStoreError>;
}
