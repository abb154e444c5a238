//! Content API: catalog-driven CRUD over a record store and an object store.

pub mod config;
pub mod error;
pub mod extractors;
pub mod handlers;
pub mod response;
pub mod routes;
pub mod service;
pub mod sql;
pub mod state;
pub mod storage;
pub mod store;

pub use config::{builtin_catalog, load_catalog, resolve, CatalogConfig, ResolvedResource, ResourceModel, Settings};
pub use error::{AppError, ConfigError};
pub use routes::{app, common_routes, resource_routes};
pub use service::CrudService;
pub use state::AppState;
pub use storage::{MemoryObjectStore, ObjectStore, S3ObjectStore};
pub use store::{MemoryRecordStore, PgRecordStore, RecordStore};
