pub mod memory;
pub mod store;

pub use memory::InMemoryItemStore;
pub use store::ItemStore;
