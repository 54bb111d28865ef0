use crate::storage::ObjectStore;
use std::sync::Arc;

/// Shared application state
///
/// The store client is a stateless connection factory reused across
/// invocations; it carries no per-request data.
#[derive(Clone)]
pub struct AppState {
    pub storage: Arc<dyn ObjectStore>,
}

impl AppState {
    pub fn new(storage: Arc<dyn ObjectStore>) -> Self {
        Self { storage }
    }
}
