// ============================================================================
// itemflow Library
// ============================================================================

pub mod batch;
pub mod config;
pub mod core;
pub mod storage;
pub mod web;

// Re-export main types for convenience
pub use crate::batch::{BatchProcessor, BatchReport, ProcessingHandle, UnitOutcome, WorkerPool};
pub use crate::config::{ProcessingConfig, ServerConfig};
pub use crate::core::{ErrorMessage, Item, ItemDraft, ItemError, Result, STATUS_PROCESSED};
pub use crate::storage::{InMemoryItemStore, ItemStore};
pub use crate::web::{AppState, WebError, build_router};

use std::sync::Arc;

/// Wires a store into a ready-to-serve router.
///
/// Creates the batch processor (and with it the worker pool) once; every
/// request shares it. Must be called inside a tokio runtime.
///
/// # Examples
///
/// ```
/// # use std::sync::Arc;
/// # use itemflow::{InMemoryItemStore, ProcessingConfig};
/// # tokio_test::block_on(async {
/// let store = Arc::new(InMemoryItemStore::new());
/// let router = itemflow::build_app(store, &ProcessingConfig::default()).unwrap();
/// # drop(router);
/// # });
/// ```
pub fn build_app(store: Arc<dyn ItemStore>, config: &ProcessingConfig) -> Result<axum::Router> {
    let processor = BatchProcessor::new(store, config)?;
    Ok(build_router(AppState::new(processor)))
}
