//! CrudService: one adapter for every catalog resource.

mod crud;
pub mod upload;
pub mod validation;
pub use crud::CrudService;
pub use validation::{prepare, PreparedWrite, WriteMode};
