//! In-memory Record Store. Assigns integer ids and counts writes, which makes it
//! a spy in tests and a backend-free store for local runs.

use crate::config::ResolvedResource;
use crate::store::{Record, RecordId, RecordStore, RecordStoreError};
use async_trait::async_trait;
use serde_json::Value;
use std::cmp::Ordering;
use std::collections::HashMap;
use std::sync::atomic::{AtomicI64, AtomicUsize, Ordering as AtomicOrdering};
use std::sync::RwLock;

#[derive(Default)]
pub struct MemoryRecordStore {
    tables: RwLock<HashMap<String, Vec<Record>>>,
    next_id: AtomicI64,
    inserts: AtomicUsize,
    updates: AtomicUsize,
    /// When set, every call fails with this backend message.
    failure: RwLock<Option<String>>,
}

impl MemoryRecordStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of insert calls that reached the store.
    pub fn insert_count(&self) -> usize {
        self.inserts.load(AtomicOrdering::SeqCst)
    }

    pub fn update_count(&self) -> usize {
        self.updates.load(AtomicOrdering::SeqCst)
    }

    /// Make every subsequent call fail (Some) or succeed again (None).
    pub fn set_failure(&self, message: Option<&str>) {
        if let Ok(mut guard) = self.failure.write() {
            *guard = message.map(String::from);
        }
    }

    fn check_failure(&self) -> Result<(), RecordStoreError> {
        let guard = self.failure.read().map_err(|_| lock_poisoned())?;
        match guard.as_ref() {
            Some(message) => Err(RecordStoreError::Backend(message.clone())),
            None => Ok(()),
        }
    }
}

fn lock_poisoned() -> RecordStoreError {
    RecordStoreError::Backend("memory store lock poisoned".into())
}

fn matches_id(record: &Record, pk: &str, id: &RecordId) -> bool {
    match (record.get(pk), id) {
        (Some(Value::Number(n)), RecordId::Int(i)) => n.as_i64() == Some(*i),
        (Some(Value::String(s)), RecordId::Text(t)) => s == t,
        (Some(Value::String(s)), RecordId::Uuid(u)) => s == &u.to_string(),
        _ => false,
    }
}

/// Total order over JSON scalars for sorting: nulls first, then numbers, then strings.
fn compare_values(a: Option<&Value>, b: Option<&Value>) -> Ordering {
    fn rank(v: Option<&Value>) -> u8 {
        match v {
            None | Some(Value::Null) => 0,
            Some(Value::Number(_)) => 1,
            Some(Value::String(_)) => 2,
            _ => 3,
        }
    }
    match (a, b) {
        (Some(Value::Number(x)), Some(Value::Number(y))) => x
            .as_f64()
            .partial_cmp(&y.as_f64())
            .unwrap_or(Ordering::Equal),
        (Some(Value::String(x)), Some(Value::String(y))) => x.cmp(y),
        _ => rank(a).cmp(&rank(b)),
    }
}

#[async_trait]
impl RecordStore for MemoryRecordStore {
    async fn insert(&self, resource: &ResolvedResource, mut record: Record) -> Result<Vec<Record>, RecordStoreError> {
        self.check_failure()?;
        self.inserts.fetch_add(1, AtomicOrdering::SeqCst);
        let id = self.next_id.fetch_add(1, AtomicOrdering::SeqCst) + 1;
        record.insert(resource.pk_column.clone(), Value::from(id));
        let mut tables = self.tables.write().map_err(|_| lock_poisoned())?;
        tables
            .entry(resource.table_name.clone())
            .or_default()
            .push(record.clone());
        Ok(vec![record])
    }

    async fn select_all(&self, resource: &ResolvedResource) -> Result<Vec<Record>, RecordStoreError> {
        self.check_failure()?;
        let tables = self.tables.read().map_err(|_| lock_poisoned())?;
        let mut rows = tables.get(&resource.table_name).cloned().unwrap_or_default();
        let sort = resource.sort_column();
        rows.sort_by(|a, b| compare_values(a.get(sort), b.get(sort)));
        Ok(rows)
    }

    async fn select_by_id(&self, resource: &ResolvedResource, id: &RecordId) -> Result<Record, RecordStoreError> {
        self.check_failure()?;
        let tables = self.tables.read().map_err(|_| lock_poisoned())?;
        tables
            .get(&resource.table_name)
            .and_then(|rows| rows.iter().find(|r| matches_id(r, &resource.pk_column, id)))
            .cloned()
            .ok_or_else(|| RecordStoreError::not_found(resource, id))
    }

    async fn update_by_id(
        &self,
        resource: &ResolvedResource,
        id: &RecordId,
        patch: Record,
    ) -> Result<Vec<Record>, RecordStoreError> {
        self.check_failure()?;
        self.updates.fetch_add(1, AtomicOrdering::SeqCst);
        let mut tables = self.tables.write().map_err(|_| lock_poisoned())?;
        let Some(row) = tables
            .get_mut(&resource.table_name)
            .and_then(|rows| rows.iter_mut().find(|r| matches_id(r, &resource.pk_column, id)))
        else {
            return Ok(Vec::new());
        };
        for (column, value) in patch {
            row.insert(column, value);
        }
        Ok(vec![row.clone()])
    }

    async fn delete_by_id(&self, resource: &ResolvedResource, id: &RecordId) -> Result<Vec<Record>, RecordStoreError> {
        self.check_failure()?;
        let mut tables = self.tables.write().map_err(|_| lock_poisoned())?;
        let rows = tables
            .get_mut(&resource.table_name)
            .ok_or_else(|| RecordStoreError::not_found(resource, id))?;
        let position = rows
            .iter()
            .position(|r| matches_id(r, &resource.pk_column, id))
            .ok_or_else(|| RecordStoreError::not_found(resource, id))?;
        Ok(vec![rows.remove(position)])
    }

    async fn ping(&self) -> Result<(), RecordStoreError> {
        self.check_failure()
    }
}
