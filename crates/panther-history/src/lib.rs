//! Append-only history of anchor and status events.
//!
//! [`ProofHistoryStore`] is the storage boundary. Three adapters ship here:
//!
//! - [`InMemoryHistoryStore`]: bounded ring buffer, oldest events evicted
//! - [`FileHistoryStore`]: durable log framed with length and CRC32, recovered on open
//! - [`ResilientHistoryStore`]: durable log with an in-memory fallback that
//!   reports [`StorageDegraded`] instead of failing
//!
//! Queries return events newest first, ties broken by insertion order.

pub mod error;
pub mod file;
pub mod memory;
pub mod query;
pub mod resilient;
pub mod traits;

pub use error::{HistoryError, HistoryResult, StorageDegraded};
pub use file::{FileHistoryStore, SyncMode};
pub use memory::{InMemoryHistoryStore, DEFAULT_CAPACITY};
pub use query::{HistoryQuery, DEFAULT_HISTORY_LIMIT, MAX_HISTORY_LIMIT};
pub use resilient::ResilientHistoryStore;
pub use traits::ProofHistoryStore;
