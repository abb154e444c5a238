//! Object Store over the S3 protocol (Supabase Storage exposes an S3-compatible endpoint).

use crate::config::StorageSettings;
use crate::storage::{public_url, ObjectStore, StorageError};
use async_trait::async_trait;
use aws_sdk_s3::config::{Credentials, Region};
use aws_sdk_s3::error::DisplayErrorContext;
use aws_sdk_s3::primitives::ByteStream;
use axum::body::Bytes;

#[derive(Clone)]
pub struct S3ObjectStore {
    client: aws_sdk_s3::Client,
    public_url: String,
}

impl S3ObjectStore {
    /// Build a path-style client for the configured endpoint with static credentials.
    pub async fn connect(settings: &StorageSettings) -> Self {
        let credentials = Credentials::new(
            settings.access_key_id.clone(),
            settings.secret_access_key.clone(),
            None,
            None,
            "content-api",
        );
        let shared = aws_config::defaults(aws_config::BehaviorVersion::latest())
            .region(Region::new(settings.region.clone()))
            .endpoint_url(settings.endpoint.clone())
            .credentials_provider(credentials)
            .load()
            .await;
        let config = aws_sdk_s3::config::Builder::from(&shared)
            .force_path_style(true)
            .build();
        tracing::info!(endpoint = %settings.endpoint, region = %settings.region, "object store client ready");
        Self::from_client(aws_sdk_s3::Client::from_conf(config), settings.public_url.clone())
    }

    pub fn from_client(client: aws_sdk_s3::Client, public_url: String) -> Self {
        S3ObjectStore { client, public_url }
    }
}

#[async_trait]
impl ObjectStore for S3ObjectStore {
    async fn upload(&self, bucket: &str, path: &str, bytes: Bytes, content_type: &str) -> Result<String, StorageError> {
        let size = bytes.len();
        self.client
            .put_object()
            .bucket(bucket)
            .key(path)
            .content_type(content_type)
            .body(ByteStream::from(bytes))
            .send()
            .await
            .map_err(|e| StorageError::Rejected(DisplayErrorContext(&e).to_string()))?;
        tracing::debug!(bucket, path, size, "object uploaded");
        Ok(public_url(&self.public_url, bucket, path))
    }
}
