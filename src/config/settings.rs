//! Process settings from environment variables (`.env` is loaded by the server binary).

use crate::error::ConfigError;
use std::path::PathBuf;

pub const DEFAULT_PORT: u16 = 5000;
pub const DEFAULT_MAX_BODY_BYTES: usize = 50 * 1024 * 1024;

/// Credentials and URLs for the S3-compatible object store.
#[derive(Clone, Debug)]
pub struct StorageSettings {
    /// S3 API endpoint, e.g. `https://<project>.supabase.co/storage/v1/s3`.
    pub endpoint: String,
    pub region: String,
    pub access_key_id: String,
    pub secret_access_key: String,
    /// Base of public object URLs; `<public_url>/<bucket>/<path>`.
    pub public_url: String,
}

#[derive(Clone, Debug)]
pub struct Settings {
    pub port: u16,
    pub database_url: String,
    /// Overrides the catalog's default schema when set.
    pub database_schema: Option<String>,
    pub max_connections: u32,
    pub storage: StorageSettings,
    pub resources_path: Option<PathBuf>,
    pub max_body_bytes: usize,
}

impl Settings {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build settings from any key lookup. Empty values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());
        let require = |key: &'static str| get(key).ok_or(ConfigError::MissingSetting(key));

        let supabase_url = get("SUPABASE_URL").map(|u| u.trim_end_matches('/').to_string());
        let endpoint = get("STORAGE_ENDPOINT")
            .or_else(|| supabase_url.as_ref().map(|u| format!("{}/storage/v1/s3", u)))
            .ok_or(ConfigError::MissingSetting("STORAGE_ENDPOINT"))?;
        let public_url = get("STORAGE_PUBLIC_URL")
            .or_else(|| supabase_url.as_ref().map(|u| format!("{}/storage/v1/object/public", u)))
            .ok_or(ConfigError::MissingSetting("STORAGE_PUBLIC_URL"))?;

        Ok(Settings {
            port: parse_or("PORT", get("PORT"), DEFAULT_PORT)?,
            database_url: require("DATABASE_URL")?,
            database_schema: get("DATABASE_SCHEMA"),
            max_connections: parse_or("DATABASE_MAX_CONNECTIONS", get("DATABASE_MAX_CONNECTIONS"), 5)?,
            storage: StorageSettings {
                endpoint,
                region: get("STORAGE_REGION").unwrap_or_else(|| "us-east-1".into()),
                access_key_id: require("STORAGE_ACCESS_KEY_ID")?,
                secret_access_key: require("STORAGE_SECRET_ACCESS_KEY")?,
                public_url: public_url.trim_end_matches('/').to_string(),
            },
            resources_path: get("RESOURCES_PATH").map(PathBuf::from),
            max_body_bytes: parse_or("MAX_BODY_BYTES", get("MAX_BODY_BYTES"), DEFAULT_MAX_BODY_BYTES)?,
        })
    }
}

fn parse_or<T>(name: &'static str, raw: Option<String>, default: T) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match raw {
        None => Ok(default),
        Some(s) => s.parse().map_err(|e: T::Err| ConfigError::InvalidSetting {
            name,
            reason: format!("'{}': {}", s, e),
        }),
    }
}
