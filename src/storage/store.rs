use crate::core::{Item, Result};
use async_trait::async_trait;

/// Persistence collaborator for items.
///
/// Implementations must be safe for concurrent independent calls. No
/// coordination across calls is assumed: two saves of different items are
/// unrelated writes.
#[async_trait]
pub trait ItemStore: Send + Sync {
    /// Every stored item, ordered by id.
    async fn list_all(&self) -> Result<Vec<Item>>;

    async fn find_by_id(&self, id: i64) -> Result<Option<Item>>;

    /// Inserts the item when it has no id yet (assigning one), otherwise
    /// replaces the stored item with the same id.
    async fn save(&self, item: Item) -> Result<Item>;

    /// Removing an id that is not stored is a no-op.
    async fn delete_by_id(&self, id: i64) -> Result<()>;

    async fn list_all_ids(&self) -> Result<Vec<i64>>;
}
