//! Generic resource adapter: validation, uploads, then one Record Store call.

use crate::config::ResolvedResource;
use crate::error::AppError;
use crate::extractors::ResourcePayload;
use crate::service::upload::object_path;
use crate::service::validation::{prepare, PreparedWrite, WriteMode};
use crate::storage::ObjectStore;
use crate::store::{Record, RecordId, RecordStore};
use serde_json::Value;
use std::sync::Arc;

#[derive(Clone)]
pub struct CrudService {
    records: Arc<dyn RecordStore>,
    objects: Arc<dyn ObjectStore>,
}

impl CrudService {
    pub fn new(records: Arc<dyn RecordStore>, objects: Arc<dyn ObjectStore>) -> Self {
        CrudService { records, objects }
    }

    pub fn records(&self) -> &Arc<dyn RecordStore> {
        &self.records
    }

    /// Validate, upload files, insert. Returns the inserted row(s).
    pub async fn create(&self, resource: &ResolvedResource, payload: &ResourcePayload) -> Result<Vec<Record>, AppError> {
        let prepared = prepare(resource, payload, WriteMode::Create)?;
        let record = self.upload_files(prepared).await?;
        let rows = self.records.insert(resource, record).await?;
        tracing::info!(resource = %resource.path_segment, rows = rows.len(), "record created");
        Ok(rows)
    }

    /// All rows, ascending by the resource sort column.
    pub async fn list(&self, resource: &ResolvedResource) -> Result<Vec<Record>, AppError> {
        Ok(self.records.select_all(resource).await?)
    }

    pub async fn read(&self, resource: &ResolvedResource, id: &RecordId) -> Result<Record, AppError> {
        Ok(self.records.select_by_id(resource, id).await?)
    }

    /// Partial update: only fields present in the request are written. Empty when `id` has no row.
    pub async fn update(
        &self,
        resource: &ResolvedResource,
        id: &RecordId,
        payload: &ResourcePayload,
    ) -> Result<Vec<Record>, AppError> {
        let prepared = prepare(resource, payload, WriteMode::Update)?;
        let patch = self.upload_files(prepared).await?;
        let rows = self.records.update_by_id(resource, id, patch).await?;
        tracing::info!(resource = %resource.path_segment, id = %id, rows = rows.len(), "record updated");
        Ok(rows)
    }

    /// Remove the row; referenced objects stay in storage.
    pub async fn delete(&self, resource: &ResolvedResource, id: &RecordId) -> Result<Vec<Record>, AppError> {
        let rows = self.records.delete_by_id(resource, id).await?;
        tracing::info!(resource = %resource.path_segment, id = %id, "record deleted");
        Ok(rows)
    }

    /// Upload every pending file in order and fold the URLs into the columns.
    /// The first failure aborts; objects already stored are left in place.
    async fn upload_files(&self, prepared: PreparedWrite) -> Result<Record, AppError> {
        let PreparedWrite { mut columns, uploads } = prepared;
        for (field, files) in uploads {
            let mut urls = Vec::with_capacity(files.len());
            for file in files {
                let millis = chrono::Utc::now().timestamp_millis();
                let path = object_path(&field, &file.file_name, millis);
                let url = self
                    .objects
                    .upload(&field.bucket, &path, file.bytes, &file.content_type)
                    .await
                    .map_err(|source| AppError::Upload {
                        message: field.upload_error.clone(),
                        source,
                    })?;
                urls.push(Value::String(url));
            }
            let value = if field.is_list() {
                Value::Array(urls)
            } else {
                urls.into_iter().next().unwrap_or(Value::Null)
            };
            columns.insert(field.name.clone(), value);
        }
        Ok(columns)
    }
}
