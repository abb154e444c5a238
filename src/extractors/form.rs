//! Resource request body: multipart form, JSON object or url-encoded form, read into one payload.

use crate::error::AppError;
use async_trait::async_trait;
use axum::{
    body::Bytes,
    extract::{FromRequest, Multipart, Request},
    http::{header::CONTENT_TYPE, StatusCode},
    Form, Json,
};
use serde_json::Value;
use std::collections::HashMap;

pub const DEFAULT_CONTENT_TYPE: &str = "application/octet-stream";

/// One file part of a multipart request. Lives only for the request.
#[derive(Clone, Debug)]
pub struct UploadedFile {
    pub file_name: String,
    pub content_type: String,
    pub bytes: Bytes,
}

/// Non-file values by field name, and file parts grouped by field name in arrival order.
#[derive(Clone, Debug, Default)]
pub struct ResourcePayload {
    pub fields: HashMap<String, Value>,
    pub files: HashMap<String, Vec<UploadedFile>>,
}

impl ResourcePayload {
    pub fn field(&self, name: &str) -> Option<&Value> {
        self.fields.get(name)
    }

    pub fn files(&self, name: &str) -> &[UploadedFile] {
        self.files.get(name).map(Vec::as_slice).unwrap_or(&[])
    }
}

/// Extractor dispatching on `Content-Type`. Anything unrecognised (or no body) is an empty payload.
#[derive(Debug, Default)]
pub struct ResourceForm(pub ResourcePayload);

#[async_trait]
impl<S> FromRequest<S> for ResourceForm
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let content_type = req
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(|s| s.to_ascii_lowercase())
            .unwrap_or_default();

        let payload = if content_type.starts_with("multipart/form-data") {
            let multipart = Multipart::from_request(req, state)
                .await
                .map_err(|e| rejected(e.status(), e.body_text()))?;
            read_multipart(multipart).await?
        } else if content_type.starts_with("application/json") {
            let Json(value) = Json::<Value>::from_request(req, state)
                .await
                .map_err(|e| rejected(e.status(), e.body_text()))?;
            match value {
                Value::Object(map) => ResourcePayload {
                    fields: map.into_iter().collect(),
                    files: HashMap::new(),
                },
                _ => return Err(AppError::BadRequest("body must be a JSON object".into())),
            }
        } else if content_type.starts_with("application/x-www-form-urlencoded") {
            let Form(form) = Form::<HashMap<String, String>>::from_request(req, state)
                .await
                .map_err(|e| rejected(e.status(), e.body_text()))?;
            ResourcePayload {
                fields: form.into_iter().map(|(k, v)| (k, Value::String(v))).collect(),
                files: HashMap::new(),
            }
        } else {
            ResourcePayload::default()
        };
        Ok(ResourceForm(payload))
    }
}

/// Body rejections keep the size limit status; anything else is a bad request.
fn rejected(status: StatusCode, text: String) -> AppError {
    if status == StatusCode::PAYLOAD_TOO_LARGE {
        AppError::PayloadTooLarge(text)
    } else {
        AppError::BadRequest(text)
    }
}

async fn read_multipart(mut multipart: Multipart) -> Result<ResourcePayload, AppError> {
    let mut payload = ResourcePayload::default();
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| rejected(e.status(), e.body_text()))?
    {
        let Some(name) = field.name().map(str::to_string) else {
            continue;
        };
        match field.file_name().map(str::to_string) {
            Some(file_name) => {
                let content_type = field.content_type().unwrap_or(DEFAULT_CONTENT_TYPE).to_string();
                let bytes = field
                    .bytes()
                    .await
                    .map_err(|e| rejected(e.status(), e.body_text()))?;
                // Browsers send an empty file part for an untouched file input.
                if file_name.is_empty() && bytes.is_empty() {
                    continue;
                }
                payload.files.entry(name).or_default().push(UploadedFile {
                    file_name,
                    content_type,
                    bytes,
                });
            }
            None => {
                let text = field
                    .text()
                    .await
                    .map_err(|e| rejected(e.status(), e.body_text()))?;
                payload.fields.insert(name, Value::String(text));
            }
        }
    }
    Ok(payload)
}
