//! Resolved resource model: catalog validated and flattened for runtime use.

use crate::config::{JsonShape, PathNaming, PkType};
use std::collections::{HashMap, HashSet};
use std::fmt;
use std::str::FromStr;

/// One of the five routes every resource can expose.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Operation {
    Create,
    List,
    Read,
    Update,
    Delete,
}

impl Operation {
    pub const ALL: [Operation; 5] = [
        Operation::Create,
        Operation::List,
        Operation::Read,
        Operation::Update,
        Operation::Delete,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Operation::Create => "create",
            Operation::List => "list",
            Operation::Read => "read",
            Operation::Update => "update",
            Operation::Delete => "delete",
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Operation {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Operation::ALL
            .into_iter()
            .find(|op| op.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| format!("unknown operation: {}", s))
    }
}

#[derive(Clone, Debug)]
pub struct FileField {
    pub name: String,
    pub bucket: String,
    pub max_count: u32,
    pub folder: Option<String>,
    pub naming: PathNaming,
    pub tag: Option<String>,
    pub upload_error: String,
}

impl FileField {
    pub fn is_list(&self) -> bool {
        self.max_count > 1
    }
}

#[derive(Clone, Debug)]
pub struct JsonField {
    pub name: String,
    pub shape: JsonShape,
    pub error: String,
}

#[derive(Clone, Debug)]
pub struct EnumField {
    pub name: String,
    pub allowed: Vec<String>,
    pub error: String,
}

impl EnumField {
    pub fn allows(&self, value: &str) -> bool {
        self.allowed.iter().any(|a| a == value)
    }
}

#[derive(Clone, Debug)]
pub struct ResolvedResource {
    pub path_segment: String,
    pub schema_name: String,
    pub table_name: String,
    pub label: String,
    pub pk_column: String,
    pub pk_type: PkType,
    pub text_fields: Vec<String>,
    pub file_fields: Vec<FileField>,
    pub json_fields: Vec<JsonField>,
    pub enum_fields: Vec<EnumField>,
    /// Ascending sort for list; primary key when unset.
    pub order_by: Option<String>,
    pub operations: HashSet<Operation>,
}

impl ResolvedResource {
    pub fn allows(&self, op: Operation) -> bool {
        self.operations.contains(&op)
    }

    pub fn file_field(&self, name: &str) -> Option<&FileField> {
        self.file_fields.iter().find(|f| f.name == name)
    }

    pub fn sort_column(&self) -> &str {
        self.order_by.as_deref().unwrap_or(&self.pk_column)
    }
}

#[derive(Clone, Debug, Default)]
pub struct ResourceModel {
    pub resources: Vec<ResolvedResource>,
    by_path: HashMap<String, usize>,
}

impl ResourceModel {
    pub fn new(resources: Vec<ResolvedResource>) -> Self {
        let by_path = resources
            .iter()
            .enumerate()
            .map(|(i, r)| (r.path_segment.clone(), i))
            .collect();
        ResourceModel { resources, by_path }
    }

    pub fn resource_by_path(&self, path: &str) -> Option<&ResolvedResource> {
        self.by_path.get(path).map(|&i| &self.resources[i])
    }
}
