use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ItemError {
    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Item {0} not found")]
    NotFound(i64),

    #[error("Worker pool is closed")]
    PoolClosed,

    #[error("Unit interrupted: {0}")]
    Interrupted(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

impl ItemError {
    pub fn storage(message: impl Into<String>) -> Self {
        Self::Storage(message.into())
    }
}

pub type Result<T> = std::result::Result<T, ItemError>;
