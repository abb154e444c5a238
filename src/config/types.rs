//! Raw catalog types matching the resource catalog JSON.

use serde::{Deserialize, Serialize};

fn default_schema() -> String {
    "public".into()
}

fn default_primary_key() -> String {
    "id".into()
}

fn default_max_count() -> u32 {
    1
}

/// Primary key type declared in the catalog; used to parse `/:resource/:id`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PkType {
    #[default]
    BigInt,
    Int,
    Uuid,
    Text,
}

/// How an object path is derived from the upload time and the original filename.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PathNaming {
    /// `<millis><.ext>`
    #[default]
    Timestamp,
    /// `<millis>-[<tag>-]<original name>`
    Original,
}

/// Expected JSON shape of a JSON-encoded field once parsed.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JsonShape {
    #[default]
    Any,
    Array,
    Object,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct FileFieldConfig {
    pub name: String,
    /// Greater than 1 makes this a list field stored as an array of URLs.
    #[serde(default = "default_max_count")]
    pub max_count: u32,
    /// Overrides the resource bucket for this field.
    #[serde(default)]
    pub bucket: Option<String>,
    #[serde(default)]
    pub folder: Option<String>,
    #[serde(default)]
    pub naming: PathNaming,
    #[serde(default)]
    pub tag: Option<String>,
    /// Client-facing message when the upload fails.
    #[serde(default)]
    pub upload_error: Option<String>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct JsonFieldConfig {
    pub name: String,
    #[serde(default)]
    pub shape: JsonShape,
    #[serde(default)]
    pub error: Option<String>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct EnumFieldConfig {
    pub name: String,
    pub allowed: Vec<String>,
    #[serde(default)]
    pub error: Option<String>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ResourceConfig {
    pub table: String,
    /// Route segment; defaults to the table name.
    #[serde(default)]
    pub path_segment: Option<String>,
    #[serde(default)]
    pub schema: Option<String>,
    /// Human label used in delete messages ("Tagline deleted").
    #[serde(default)]
    pub label: Option<String>,
    #[serde(default = "default_primary_key")]
    pub primary_key: String,
    #[serde(default)]
    pub pk_type: PkType,
    #[serde(default)]
    pub bucket: Option<String>,
    #[serde(default)]
    pub text_fields: Vec<String>,
    #[serde(default)]
    pub file_fields: Vec<FileFieldConfig>,
    #[serde(default)]
    pub json_fields: Vec<JsonFieldConfig>,
    #[serde(default)]
    pub enum_fields: Vec<EnumFieldConfig>,
    #[serde(default)]
    pub order_by: Option<String>,
    /// Subset of create, list, read, update, delete. All when omitted.
    #[serde(default)]
    pub operations: Option<Vec<String>>,
}

impl ResourceConfig {
    pub fn path_segment(&self) -> &str {
        self.path_segment.as_deref().unwrap_or(&self.table)
    }
}

/// The whole catalog, as loaded from JSON.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct CatalogConfig {
    #[serde(default = "default_schema")]
    pub schema: String,
    pub resources: Vec<ResourceConfig>,
}
