//! Object path generation for uploaded files.

use crate::config::{FileField, PathNaming};
use regex::Regex;
use std::sync::OnceLock;

fn unsafe_chars() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"[^A-Za-z0-9._-]").expect("file name pattern is valid"))
}

/// Final path component of a client-supplied filename, restricted to `[A-Za-z0-9._-]`.
pub fn sanitize_file_name(original: &str) -> String {
    let base = original.rsplit(['/', '\\']).next().unwrap_or(original);
    let cleaned = unsafe_chars().replace_all(base, "_");
    if cleaned.is_empty() {
        "file".into()
    } else {
        cleaned.into_owned()
    }
}

/// Extension of the original filename including the dot, or empty.
fn extension(original: &str) -> String {
    let name = sanitize_file_name(original);
    match name.rfind('.') {
        Some(i) if i > 0 && i + 1 < name.len() => name[i..].to_string(),
        _ => String::new(),
    }
}

/// Bucket-relative path for a file uploaded at `millis`.
pub fn object_path(field: &FileField, original_name: &str, millis: i64) -> String {
    let name = match field.naming {
        PathNaming::Timestamp => format!("{}{}", millis, extension(original_name)),
        PathNaming::Original => match &field.tag {
            Some(tag) => format!("{}-{}-{}", millis, tag, sanitize_file_name(original_name)),
            None => format!("{}-{}", millis, sanitize_file_name(original_name)),
        },
    };
    match field.folder.as_deref().map(|f| f.trim_matches('/')) {
        Some(folder) if !folder.is_empty() => format!("{}/{}", folder, name),
        _ => name,
    }
}
