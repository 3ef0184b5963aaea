/// Errors produced by history stores.
#[derive(Debug, thiserror::Error)]
pub enum HistoryError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialization(String),

    #[error("history lock poisoned")]
    LockPoisoned,
}

pub type HistoryResult<T> = Result<T, HistoryError>;

/// Durable history is unavailable; events are being kept in memory only.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("history storage degraded: {reason}")]
pub struct StorageDegraded {
    pub reason: String,
}

impl StorageDegraded {
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }
}
