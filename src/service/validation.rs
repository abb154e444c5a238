//! Payload validation against a resource descriptor. Runs before any upload or store call.

use crate::config::{FileField, JsonShape, ResolvedResource};
use crate::error::AppError;
use crate::extractors::{ResourcePayload, UploadedFile};
use crate::store::Record;
use serde_json::Value;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum WriteMode {
    Create,
    Update,
}

/// Columns ready to write, plus the files still to upload per file field (declaration order).
#[derive(Debug, Default)]
pub struct PreparedWrite {
    pub columns: Record,
    pub uploads: Vec<(FileField, Vec<UploadedFile>)>,
}

/// Check `payload` against `resource` and split it into columns and pending uploads.
///
/// On create every JSON field is required and every file field without a file is written as
/// `null`. On update only what the request carries is written.
pub fn prepare(resource: &ResolvedResource, payload: &ResourcePayload, mode: WriteMode) -> Result<PreparedWrite, AppError> {
    let mut columns = Record::new();

    for name in &resource.text_fields {
        if let Some(v) = payload.field(name) {
            columns.insert(name.clone(), v.clone());
        }
    }

    for field in &resource.json_fields {
        match payload.field(&field.name) {
            Some(v) => {
                let parsed = parse_json_field(v, field.shape).ok_or_else(|| AppError::Validation(field.error.clone()))?;
                columns.insert(field.name.clone(), parsed);
            }
            None if mode == WriteMode::Create => return Err(AppError::Validation(field.error.clone())),
            None => {}
        }
    }

    for field in &resource.enum_fields {
        if let Some(v) = payload.field(&field.name) {
            match v.as_str() {
                Some(s) if field.allows(s) => {
                    columns.insert(field.name.clone(), v.clone());
                }
                _ => return Err(AppError::Validation(field.error.clone())),
            }
        }
    }

    for (name, files) in &payload.files {
        let field = resource
            .file_field(name)
            .ok_or_else(|| AppError::BadRequest(format!("unexpected file field: {}", name)))?;
        if files.len() > field.max_count as usize {
            return Err(AppError::BadRequest(format!(
                "too many files for {}: at most {}",
                name, field.max_count
            )));
        }
    }

    let mut uploads = Vec::new();
    for field in &resource.file_fields {
        let files = payload.files(&field.name);
        if !files.is_empty() {
            uploads.push((field.clone(), files.to_vec()));
        } else if mode == WriteMode::Create {
            columns.insert(field.name.clone(), Value::Null);
        }
    }

    Ok(PreparedWrite { columns, uploads })
}

/// A JSON field arrives either as JSON text or already structured (JSON bodies).
fn parse_json_field(value: &Value, shape: JsonShape) -> Option<Value> {
    let parsed = match value {
        Value::String(s) => serde_json::from_str::<Value>(s).ok()?,
        Value::Array(_) | Value::Object(_) => value.clone(),
        _ => return None,
    };
    let fits = match shape {
        JsonShape::Any => true,
        JsonShape::Array => parsed.is_array(),
        JsonShape::Object => parsed.is_object(),
    };
    fits.then_some(parsed)
}
