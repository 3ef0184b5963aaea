use panther_types::AnchorEvent;

use crate::error::{HistoryResult, StorageDegraded};
use crate::query::HistoryQuery;

/// Storage boundary for the anchor/status history.
///
/// Appends are serialized; readers never observe a partially written event.
pub trait ProofHistoryStore: Send + Sync {
    fn append(&self, event: AnchorEvent) -> HistoryResult<()>;

    /// Matching events, newest first.
    fn query(&self, query: &HistoryQuery) -> HistoryResult<Vec<AnchorEvent>>;

    /// `Some` while the store is running without its durable backend.
    fn degraded(&self) -> Option<StorageDegraded> {
        None
    }
}
