use crate::core::Item;
use std::sync::{Mutex, MutexGuard, PoisonError};

/// Append-only collection shared by every unit of one batch.
///
/// Appends from concurrent units are serialized by the inner mutex; callers
/// never lock anything themselves. Order is append order.
#[derive(Debug, Default)]
pub struct ResultAccumulator {
    items: Mutex<Vec<Item>>,
}

impl ResultAccumulator {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            items: Mutex::new(Vec::with_capacity(capacity)),
        }
    }

    pub fn push(&self, item: Item) {
        self.guard().push(item);
    }

    pub fn len(&self) -> usize {
        self.guard().len()
    }

    pub fn is_empty(&self) -> bool {
        self.guard().is_empty()
    }

    /// Moves the collected items out, leaving the accumulator empty.
    pub fn take(&self) -> Vec<Item> {
        std::mem::take(&mut *self.guard())
    }

    // A push cannot leave the vector half-written, so a poisoned lock still
    // guards consistent data.
    fn guard(&self) -> MutexGuard<'_, Vec<Item>> {
        self.items.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
