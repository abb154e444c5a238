//! Catalog validation: identifiers, buckets, path segments and field rules.

use crate::config::{CatalogConfig, ResourceConfig};
use crate::error::ConfigError;
use regex::Regex;
use std::collections::HashSet;
use std::sync::OnceLock;

/// Path segments owned by the service routes; a resource under one of these would be unreachable.
pub const RESERVED_PATH_SEGMENTS: &[&str] = &["health", "ready", "version", "info"];

fn identifier_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*$").expect("identifier pattern is valid"))
}

fn check_identifier(kind: &str, value: &str) -> Result<(), ConfigError> {
    if identifier_pattern().is_match(value) {
        Ok(())
    } else {
        Err(ConfigError::Validation(format!("invalid {} identifier: '{}'", kind, value)))
    }
}

pub fn validate(config: &CatalogConfig) -> Result<(), ConfigError> {
    check_identifier("schema", &config.schema)?;
    let mut path_segments = HashSet::new();
    for resource in &config.resources {
        validate_resource(resource)?;
        let segment = resource.path_segment();
        if RESERVED_PATH_SEGMENTS.contains(&segment) {
            return Err(ConfigError::ReservedPathSegment(segment.to_string()));
        }
        if !path_segments.insert(segment) {
            return Err(ConfigError::DuplicatePathSegment(segment.to_string()));
        }
    }
    Ok(())
}

fn validate_resource(resource: &ResourceConfig) -> Result<(), ConfigError> {
    let table = resource.table.as_str();
    check_identifier("table", table)?;
    check_identifier("path segment", resource.path_segment())?;
    check_identifier("column", &resource.primary_key)?;
    if let Some(schema) = &resource.schema {
        check_identifier("schema", schema)?;
    }
    if let Some(order_by) = &resource.order_by {
        check_identifier("column", order_by)?;
    }

    let mut names = HashSet::new();
    let declared = resource
        .text_fields
        .iter()
        .chain(resource.file_fields.iter().map(|f| &f.name))
        .chain(resource.json_fields.iter().map(|f| &f.name))
        .chain(resource.enum_fields.iter().map(|f| &f.name));
    for name in declared {
        check_identifier("column", name)?;
        if name == &resource.primary_key {
            return Err(ConfigError::Validation(format!(
                "{}: primary key '{}' cannot be a writable field",
                table, name
            )));
        }
        if !names.insert(name.as_str()) {
            return Err(ConfigError::Validation(format!("{}: field '{}' declared twice", table, name)));
        }
    }

    for field in &resource.file_fields {
        if field.max_count == 0 {
            return Err(ConfigError::Validation(format!(
                "{}: file field '{}' must allow at least one file",
                table, field.name
            )));
        }
        let bucket = field.bucket.as_deref().or(resource.bucket.as_deref());
        if bucket.map(str::is_empty).unwrap_or(true) {
            return Err(ConfigError::MissingBucket {
                resource: table.to_string(),
                field: field.name.clone(),
            });
        }
    }

    for field in &resource.enum_fields {
        if field.allowed.is_empty() {
            return Err(ConfigError::Validation(format!(
                "{}: enum field '{}' has no allowed values",
                table, field.name
            )));
        }
    }

    if let Some(ops) = &resource.operations {
        for op in ops {
            op.parse::<crate::config::Operation>()
                .map_err(|e| ConfigError::Validation(format!("{}: {}", table, e)))?;
        }
    }
    Ok(())
}
