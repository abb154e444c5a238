//! Request extractors.

pub mod form;

pub use form::{ResourceForm, ResourcePayload, UploadedFile};
