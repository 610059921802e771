pub mod error;
pub mod item;

pub use error::{ItemError, Result};
pub use item::{ErrorMessage, Item, ItemDraft, STATUS_PROCESSED};
