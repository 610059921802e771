//! Fixed-size async worker pool.
//!
//! `worker_count` tasks are spawned once and share a single job queue. A job
//! is a boxed future; each worker runs one job to completion before taking
//! the next, so at most `worker_count` jobs make progress at any time and
//! the rest wait in the queue.

use crate::core::{ItemError, Result};
use futures::FutureExt;
use futures::future::BoxFuture;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use tokio::sync::{Mutex, mpsc, oneshot};
use tracing::{debug, warn};

type Job = BoxFuture<'static, ()>;

pub struct WorkerPool {
    sender: mpsc::UnboundedSender<Job>,
    worker_count: usize,
}

impl WorkerPool {
    /// Spawns the workers on the current tokio runtime.
    ///
    /// Workers exit once the pool is dropped and the queue has drained.
    pub fn new(worker_count: usize) -> Result<Self> {
        if worker_count == 0 {
            return Err(ItemError::InvalidConfig(
                "worker_count must be > 0".to_string(),
            ));
        }

        let (sender, receiver) = mpsc::unbounded_channel::<Job>();
        let receiver = Arc::new(Mutex::new(receiver));

        for worker in 0..worker_count {
            let receiver = Arc::clone(&receiver);
            tokio::spawn(async move {
                loop {
                    // the guard is released before the job runs
                    let job = receiver.lock().await.recv().await;
                    let Some(job) = job else {
                        break;
                    };

                    if AssertUnwindSafe(job).catch_unwind().await.is_err() {
                        warn!(worker, "job panicked; worker continues");
                    }
                }
                debug!(worker, "worker stopped");
            });
        }

        Ok(Self {
            sender,
            worker_count,
        })
    }

    pub fn worker_count(&self) -> usize {
        self.worker_count
    }

    /// Queues `future` and returns the receiver of its output.
    ///
    /// If the future panics its sender is dropped, so the receiver yields
    /// `RecvError` instead of a value.
    pub fn submit<F, T>(&self, future: F) -> Result<oneshot::Receiver<T>>
    where
        F: Future<Output = T> + Send + 'static,
        T: Send + 'static,
    {
        let (tx, rx) = oneshot::channel();
        let job: Job = Box::pin(async move {
            let _ = tx.send(future.await);
        });

        self.sender.send(job).map_err(|_| ItemError::PoolClosed)?;
        Ok(rx)
    }
}
