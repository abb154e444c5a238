//! Load the resource catalog from a JSON file or the embedded default, and resolve it.

use crate::config::resolved::{EnumField, FileField, JsonField, Operation, ResolvedResource, ResourceModel};
use crate::config::types::*;
use crate::config::validate;
use crate::error::ConfigError;
use std::collections::HashSet;
use std::path::Path;

/// Catalog of the website content resources, compiled into the binary.
const BUILTIN_CATALOG: &str = include_str!("../../config/resources.json");

/// Parse the embedded catalog.
pub fn builtin_catalog() -> Result<CatalogConfig, ConfigError> {
    serde_json::from_str(BUILTIN_CATALOG).map_err(|e| ConfigError::Load(format!("builtin catalog: {}", e)))
}

/// Read a catalog from `path`, or fall back to the embedded one when `path` is None.
pub async fn load_catalog(path: Option<&Path>) -> Result<CatalogConfig, ConfigError> {
    let Some(path) = path else {
        return builtin_catalog();
    };
    tracing::debug!(path = %path.display(), "loading resource catalog");
    let raw = tokio::fs::read_to_string(path)
        .await
        .map_err(|e| ConfigError::Load(format!("{}: {}", path.display(), e)))?;
    serde_json::from_str(&raw).map_err(|e| ConfigError::Load(format!("{}: {}", path.display(), e)))
}

/// Build the runtime model from a catalog (validates first).
pub fn resolve(config: &CatalogConfig) -> Result<ResourceModel, ConfigError> {
    validate(config)?;
    let resources = config
        .resources
        .iter()
        .map(|r| resolve_resource(r, &config.schema))
        .collect::<Result<Vec<_>, _>>()?;
    Ok(ResourceModel::new(resources))
}

fn resolve_resource(resource: &ResourceConfig, default_schema: &str) -> Result<ResolvedResource, ConfigError> {
    let file_fields = resource
        .file_fields
        .iter()
        .map(|f| {
            let bucket = f
                .bucket
                .clone()
                .or_else(|| resource.bucket.clone())
                .ok_or_else(|| ConfigError::MissingBucket {
                    resource: resource.table.clone(),
                    field: f.name.clone(),
                })?;
            Ok(FileField {
                name: f.name.clone(),
                bucket,
                max_count: f.max_count,
                folder: f.folder.clone().filter(|s| !s.is_empty()),
                naming: f.naming,
                tag: f.tag.clone().filter(|s| !s.is_empty()),
                upload_error: f
                    .upload_error
                    .clone()
                    .unwrap_or_else(|| format!("Failed to upload {}", f.name)),
            })
        })
        .collect::<Result<Vec<_>, ConfigError>>()?;

    let json_fields = resource
        .json_fields
        .iter()
        .map(|f| JsonField {
            name: f.name.clone(),
            shape: f.shape,
            error: f
                .error
                .clone()
                .unwrap_or_else(|| format!("Invalid {} format. Must be a JSON string.", f.name)),
        })
        .collect();

    let enum_fields = resource
        .enum_fields
        .iter()
        .map(|f| EnumField {
            name: f.name.clone(),
            allowed: f.allowed.clone(),
            error: f.error.clone().unwrap_or_else(|| format!("Invalid {} value", f.name)),
        })
        .collect();

    let operations: HashSet<Operation> = match &resource.operations {
        Some(ops) => ops
            .iter()
            .map(|op| op.parse::<Operation>().map_err(ConfigError::Validation))
            .collect::<Result<_, _>>()?,
        None => Operation::ALL.into_iter().collect(),
    };

    Ok(ResolvedResource {
        path_segment: resource.path_segment().to_string(),
        schema_name: resource.schema.clone().unwrap_or_else(|| default_schema.to_string()),
        table_name: resource.table.clone(),
        label: resource.label.clone().unwrap_or_else(|| resource.table.clone()),
        pk_column: resource.primary_key.clone(),
        pk_type: resource.pk_type,
        text_fields: resource.text_fields.clone(),
        file_fields,
        json_fields,
        enum_fields,
        order_by: resource.order_by.clone(),
        operations,
    })
}
