//! Record Store over PostgreSQL (the managed backend's database).

use crate::config::ResolvedResource;
use crate::sql::{self, bind_params, QueryBuf};
use crate::store::{Record, RecordId, RecordStore, RecordStoreError};
use async_trait::async_trait;
use serde_json::Value;
use sqlx::{PgPool, Row};

#[derive(Clone)]
pub struct PgRecordStore {
    pool: PgPool,
}

impl PgRecordStore {
    pub fn new(pool: PgPool) -> Self {
        PgRecordStore { pool }
    }

    async fn fetch_records(&self, q: &QueryBuf) -> Result<Vec<Record>, RecordStoreError> {
        tracing::debug!(sql = %q.sql, params = ?q.params, "query");
        let rows = bind_params(sqlx::query(&q.sql), &q.params)
            .fetch_all(&self.pool)
            .await
            .map_err(backend_error)?;
        rows.iter()
            .map(|row| {
                let value: Value = row.try_get(0).map_err(backend_error)?;
                into_record(value)
            })
            .collect()
    }
}

fn backend_error(e: sqlx::Error) -> RecordStoreError {
    let message = e
        .as_database_error()
        .map(|db| db.message().to_string())
        .unwrap_or_else(|| e.to_string());
    tracing::error!(error = %e, "record store failure");
    RecordStoreError::Backend(message)
}

fn into_record(value: Value) -> Result<Record, RecordStoreError> {
    match value {
        Value::Object(map) => Ok(map),
        other => Err(RecordStoreError::Backend(format!(
            "expected a row object, got {}",
            other
        ))),
    }
}

fn columns_of(record: &Record) -> Vec<&str> {
    record.keys().map(String::as_str).collect()
}

#[async_trait]
impl RecordStore for PgRecordStore {
    async fn insert(&self, resource: &ResolvedResource, record: Record) -> Result<Vec<Record>, RecordStoreError> {
        let columns = columns_of(&record);
        let q = sql::insert(resource, &columns, Value::Object(record.clone()));
        self.fetch_records(&q).await
    }

    async fn select_all(&self, resource: &ResolvedResource) -> Result<Vec<Record>, RecordStoreError> {
        self.fetch_records(&sql::select_all(resource)).await
    }

    async fn select_by_id(&self, resource: &ResolvedResource, id: &RecordId) -> Result<Record, RecordStoreError> {
        self.fetch_records(&sql::select_by_id(resource, id))
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| RecordStoreError::not_found(resource, id))
    }

    async fn update_by_id(
        &self,
        resource: &ResolvedResource,
        id: &RecordId,
        patch: Record,
    ) -> Result<Vec<Record>, RecordStoreError> {
        let columns = columns_of(&patch);
        let q = sql::update(resource, id, &columns, Value::Object(patch.clone()));
        self.fetch_records(&q).await
    }

    async fn delete_by_id(&self, resource: &ResolvedResource, id: &RecordId) -> Result<Vec<Record>, RecordStoreError> {
        let rows = self.fetch_records(&sql::delete(resource, id)).await?;
        if rows.is_empty() {
            return Err(RecordStoreError::not_found(resource, id));
        }
        Ok(rows)
    }

    async fn ping(&self) -> Result<(), RecordStoreError> {
        sqlx::query("SELECT 1")
            .fetch_optional(&self.pool)
            .await
            .map(|_| ())
            .map_err(backend_error)
    }
}
