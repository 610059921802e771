use crate::batch::BatchProcessor;
use crate::storage::ItemStore;
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn ItemStore>,
    pub processor: BatchProcessor,
}

impl AppState {
    /// The handlers use the same store the processor works on.
    pub fn new(processor: BatchProcessor) -> Self {
        Self {
            store: Arc::clone(processor.store()),
            processor,
        }
    }
}
