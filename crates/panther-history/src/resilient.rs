use std::path::Path;
use std::sync::{Arc, RwLock};

use panther_types::AnchorEvent;
use tracing::warn;

use crate::error::{HistoryError, HistoryResult, StorageDegraded};
use crate::file::{FileHistoryStore, SyncMode};
use crate::memory::InMemoryHistoryStore;
use crate::query::HistoryQuery;
use crate::traits::ProofHistoryStore;

/// History that keeps working when durable storage does not.
///
/// Events go to the primary store while it is healthy. The first failure to
/// open or append switches the store into degraded mode for the rest of its
/// life: later events are kept in the in-memory ring and
/// [`ProofHistoryStore::degraded`] reports why. Queries read both.
pub struct ResilientHistoryStore {
    primary: Option<Arc<dyn ProofHistoryStore>>,
    fallback: InMemoryHistoryStore,
    degraded: RwLock<Option<StorageDegraded>>,
}

impl ResilientHistoryStore {
    /// Memory-only history. Not considered degraded.
    pub fn memory(capacity: usize) -> Self {
        Self {
            primary: None,
            fallback: InMemoryHistoryStore::with_capacity(capacity),
            degraded: RwLock::new(None),
        }
    }

    /// Durable history at `path`, degrading to memory if it cannot be opened.
    pub fn open(path: impl AsRef<Path>, sync: SyncMode, capacity: usize) -> Self {
        let path = path.as_ref();
        match FileHistoryStore::open(path, sync) {
            Ok(store) => Self::with_primary(Arc::new(store), capacity),
            Err(e) => {
                let reason = format!("cannot open {}: {e}", path.display());
                warn!(%reason, "history storage degraded");
                Self {
                    primary: None,
                    fallback: InMemoryHistoryStore::with_capacity(capacity),
                    degraded: RwLock::new(Some(StorageDegraded::new(reason))),
                }
            }
        }
    }

    /// Wrap an arbitrary primary store.
    pub fn with_primary(primary: Arc<dyn ProofHistoryStore>, capacity: usize) -> Self {
        Self {
            primary: Some(primary),
            fallback: InMemoryHistoryStore::with_capacity(capacity),
            degraded: RwLock::new(None),
        }
    }

    fn is_degraded(&self) -> bool {
        self.degraded.read().map(|d| d.is_some()).unwrap_or(true)
    }

    fn mark_degraded(&self, err: &HistoryError) {
        let reason = format!("append failed: {err}");
        warn!(%reason, "history storage degraded");
        if let Ok(mut slot) = self.degraded.write() {
            slot.get_or_insert_with(|| StorageDegraded::new(reason));
        }
    }
}

impl ProofHistoryStore for ResilientHistoryStore {
    fn append(&self, event: AnchorEvent) -> HistoryResult<()> {
        if let Some(primary) = self.primary.as_ref().filter(|_| !self.is_degraded()) {
            match primary.append(event.clone()) {
                Ok(()) => return Ok(()),
                Err(e) => self.mark_degraded(&e),
            }
        }
        self.fallback.append(event)
    }

    fn query(&self, query: &HistoryQuery) -> HistoryResult<Vec<AnchorEvent>> {
        let mut events = self.fallback.query(query)?;
        if let Some(primary) = &self.primary {
            match primary.query(query) {
                Ok(durable) => events.extend(durable),
                Err(e) => warn!(error = %e, "durable history unreadable; serving memory only"),
            }
        }
        events.sort_by(|a, b| b.ts.cmp(&a.ts));
        events.truncate(query.limit());
        Ok(events)
    }

    fn degraded(&self) -> Option<StorageDegraded> {
        match self.degraded.read() {
            Ok(d) => d.clone(),
            Err(_) => Some(StorageDegraded::new("history lock poisoned")),
        }
    }
}
