use std::collections::VecDeque;
use std::sync::RwLock;

use panther_types::AnchorEvent;
use tracing::debug;

use crate::error::{HistoryError, HistoryResult};
use crate::query::HistoryQuery;
use crate::traits::ProofHistoryStore;

/// Events retained by a ring buffer created with [`InMemoryHistoryStore::new`].
pub const DEFAULT_CAPACITY: usize = 500;

/// Bounded in-memory history. The oldest event is evicted once full.
pub struct InMemoryHistoryStore {
    capacity: usize,
    inner: RwLock<VecDeque<AnchorEvent>>,
}

impl InMemoryHistoryStore {
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CAPACITY)
    }

    /// A ring holding at most `capacity` events (at least one).
    pub fn with_capacity(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            capacity,
            inner: RwLock::new(VecDeque::with_capacity(capacity)),
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn len(&self) -> usize {
        self.inner.read().map(|ring| ring.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for InMemoryHistoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl ProofHistoryStore for InMemoryHistoryStore {
    fn append(&self, event: AnchorEvent) -> HistoryResult<()> {
        let mut ring = self.inner.write().map_err(|_| HistoryError::LockPoisoned)?;
        if ring.len() == self.capacity {
            ring.pop_front();
        }
        debug!(action = %event.action, ts = event.ts, "history append (memory)");
        ring.push_back(event);
        Ok(())
    }

    fn query(&self, query: &HistoryQuery) -> HistoryResult<Vec<AnchorEvent>> {
        let ring = self.inner.read().map_err(|_| HistoryError::LockPoisoned)?;
        Ok(query.select(ring.iter()))
    }
}
