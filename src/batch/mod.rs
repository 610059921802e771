//! Bulk "process every item" orchestration.
//!
//! [`BatchProcessor::process_all`] reads the id list once, submits one unit
//! of work per id to a long-lived [`WorkerPool`], and returns a
//! [`ProcessingHandle`] right away. A unit fetches its item, marks it
//! processed and saves it; saved items land in a shared
//! [`ResultAccumulator`]. The handle resolves after every unit has reported
//! an outcome. Per-unit failures are logged and dropped; only a failure to
//! list ids fails the batch.

pub mod accumulator;
pub mod pool;

pub use accumulator::ResultAccumulator;
pub use pool::WorkerPool;

use crate::config::ProcessingConfig;
use crate::core::{Item, ItemError, Result};
use crate::storage::ItemStore;
use futures::future::join_all;
use serde::Serialize;
use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tracing::{Instrument, debug, error, info, info_span};
use uuid::Uuid;

/// Terminal state of one unit of work.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UnitOutcome {
    /// Item was saved with the processed status and appended to the results.
    Processed,
    /// No item behind the id at fetch time.
    Skipped,
    /// Fetch or save failed, or the unit ended without reporting.
    Failed(ItemError),
}

/// Summary of one `process_all` run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BatchReport {
    pub batch_id: Uuid,
    pub attempted: usize,
    pub processed: usize,
    pub skipped: usize,
    pub failed: usize,
    /// Saved items in completion order
    pub items: Vec<Item>,
}

/// Eventual result of a `process_all` run.
pub struct ProcessingHandle {
    batch_id: Uuid,
    task: JoinHandle<Result<BatchReport>>,
}

impl ProcessingHandle {
    pub fn batch_id(&self) -> Uuid {
        self.batch_id
    }

    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }

    pub async fn wait_report(self) -> Result<BatchReport> {
        let batch_id = self.batch_id;
        self.task
            .await
            .map_err(|err| ItemError::Interrupted(format!("batch {batch_id}: {err}")))?
    }

    /// Waits for the batch and returns only the processed items.
    pub async fn wait(self) -> Result<Vec<Item>> {
        Ok(self.wait_report().await?.items)
    }
}

#[derive(Clone)]
pub struct BatchProcessor {
    store: Arc<dyn ItemStore>,
    pool: Arc<WorkerPool>,
    unit_delay: Option<Duration>,
}

impl BatchProcessor {
    /// Creates the processor and its worker pool. Must be called inside a
    /// tokio runtime.
    pub fn new(store: Arc<dyn ItemStore>, config: &ProcessingConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            store,
            pool: Arc::new(WorkerPool::new(config.worker_count)?),
            unit_delay: config.unit_delay,
        })
    }

    pub fn store(&self) -> &Arc<dyn ItemStore> {
        &self.store
    }

    pub fn worker_count(&self) -> usize {
        self.pool.worker_count()
    }

    /// Starts processing every stored item and returns without waiting.
    pub fn process_all(&self) -> ProcessingHandle {
        let batch_id = Uuid::new_v4();
        let processor = self.clone();
        let span = info_span!("batch.process_all", %batch_id);
        let task = tokio::spawn(async move { processor.run(batch_id).await }.instrument(span));

        ProcessingHandle { batch_id, task }
    }

    async fn run(&self, batch_id: Uuid) -> Result<BatchReport> {
        let ids = self.store.list_all_ids().await.map_err(|err| {
            error!(error = %err, "failed to list item ids; batch aborted");
            err
        })?;
        let ids = dedup_ids(ids);

        info!(
            items = ids.len(),
            workers = self.pool.worker_count(),
            "batch started"
        );

        let accumulator = Arc::new(ResultAccumulator::with_capacity(ids.len()));
        let pending: Vec<_> = ids
            .iter()
            .map(|&id| {
                let store = Arc::clone(&self.store);
                let accumulator = Arc::clone(&accumulator);
                let delay = self.unit_delay;
                let unit = async move {
                    match process_unit(store.as_ref(), id, delay).await {
                        Ok(Some(item)) => {
                            accumulator.push(item);
                            UnitOutcome::Processed
                        }
                        Ok(None) => {
                            debug!(item_id = id, "item vanished before processing; skipped");
                            UnitOutcome::Skipped
                        }
                        Err(err) => {
                            error!(item_id = id, error = %err, "failed to process item");
                            UnitOutcome::Failed(err)
                        }
                    }
                }
                .in_current_span();
                (id, self.pool.submit(unit))
            })
            .collect();

        let outcomes = join_all(pending.into_iter().map(|(id, submitted)| async move {
            let receiver = match submitted {
                Ok(receiver) => receiver,
                Err(err) => {
                    error!(item_id = id, error = %err, "failed to schedule item");
                    return UnitOutcome::Failed(err);
                }
            };
            match receiver.await {
                Ok(outcome) => outcome,
                Err(_) => {
                    let err = ItemError::Interrupted(format!(
                        "unit for item {id} ended without a result"
                    ));
                    error!(item_id = id, error = %err, "item processing interrupted");
                    UnitOutcome::Failed(err)
                }
            }
        }))
        .await;

        let mut report = BatchReport {
            batch_id,
            attempted: outcomes.len(),
            processed: 0,
            skipped: 0,
            failed: 0,
            items: accumulator.take(),
        };
        for outcome in &outcomes {
            match outcome {
                UnitOutcome::Processed => report.processed += 1,
                UnitOutcome::Skipped => report.skipped += 1,
                UnitOutcome::Failed(_) => report.failed += 1,
            }
        }

        info!(
            attempted = report.attempted,
            processed = report.processed,
            skipped = report.skipped,
            failed = report.failed,
            "batch finished"
        );
        Ok(report)
    }
}

/// fetch -> mark processed -> save. `Ok(None)` when the id has no item.
async fn process_unit(
    store: &dyn ItemStore,
    id: i64,
    delay: Option<Duration>,
) -> Result<Option<Item>> {
    if let Some(delay) = delay {
        tokio::time::sleep(delay).await;
    }

    let Some(mut item) = store.find_by_id(id).await? else {
        return Ok(None);
    };
    item.mark_processed();
    let saved = store.save(item).await?;
    Ok(Some(saved))
}

fn dedup_ids(ids: Vec<i64>) -> Vec<i64> {
    let mut seen = HashSet::with_capacity(ids.len());
    ids.into_iter().filter(|id| seen.insert(*id)).collect()
}
