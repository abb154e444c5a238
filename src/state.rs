//! Shared application state for all routes.

use crate::config::ResourceModel;
use crate::service::CrudService;
use crate::storage::ObjectStore;
use crate::store::RecordStore;
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub model: Arc<ResourceModel>,
    pub crud: CrudService,
}

impl AppState {
    pub fn new(model: ResourceModel, records: Arc<dyn RecordStore>, objects: Arc<dyn ObjectStore>) -> Self {
        AppState {
            model: Arc::new(model),
            crud: CrudService::new(records, objects),
        }
    }
}
