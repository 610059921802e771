use super::ItemStore;
use crate::core::{Item, ItemError, Result};
use async_trait::async_trait;
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicI64, Ordering};
use tokio::sync::RwLock;

/// Process-local item store.
///
/// Items live in a `BTreeMap` behind a single async `RwLock`; ids come from an
/// atomic counter starting at 1 and are never reused, even after deletes.
#[derive(Debug)]
pub struct InMemoryItemStore {
    items: RwLock<BTreeMap<i64, Item>>,
    next_id: AtomicI64,
}

impl Default for InMemoryItemStore {
    fn default() -> Self {
        Self {
            items: RwLock::new(BTreeMap::new()),
            next_id: AtomicI64::new(1),
        }
    }
}

impl InMemoryItemStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored items
    pub async fn len(&self) -> usize {
        self.items.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.items.read().await.is_empty()
    }

    fn allocate_id(&self) -> Result<i64> {
        self.next_id
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |id| id.checked_add(1))
            .map_err(|_| ItemError::storage("item id space exhausted"))
    }
}

#[async_trait]
impl ItemStore for InMemoryItemStore {
    async fn list_all(&self) -> Result<Vec<Item>> {
        Ok(self.items.read().await.values().cloned().collect())
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<Item>> {
        Ok(self.items.read().await.get(&id).cloned())
    }

    async fn save(&self, mut item: Item) -> Result<Item> {
        let id = match item.id {
            Some(id) => {
                // keep generated ids ahead of any caller-chosen one
                self.next_id
                    .fetch_max(id.saturating_add(1), Ordering::SeqCst);
                id
            }
            None => self.allocate_id()?,
        };
        item.id = Some(id);

        self.items.write().await.insert(id, item.clone());
        Ok(item)
    }

    async fn delete_by_id(&self, id: i64) -> Result<()> {
        self.items.write().await.remove(&id);
        Ok(())
    }

    async fn list_all_ids(&self) -> Result<Vec<i64>> {
        Ok(self.items.read().await.keys().copied().collect())
    }
}
