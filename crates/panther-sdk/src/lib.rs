//! High-level SDK for Panther proofs.
//!
//! [`ProofService`] is the single entry point for applications: it computes
//! and verifies proofs, anchors them on a ledger, polls their status and
//! serves the anchor history. Every failure is a [`ProofError`] with a stable
//! [`kind`](ProofError::kind).

pub mod error;
pub mod service;

pub use error::{ProofError, ProofResult};
pub use service::ProofService;

// Re-export key types
pub use panther_anchor::{
    AnchorClient, AnchorReceipt, AnchorService, InMemoryLedgerClient, LedgerConfig, StatusReceipt,
};
pub use panther_history::{
    FileHistoryStore, HistoryQuery, InMemoryHistoryStore, ProofHistoryStore, DEFAULT_HISTORY_LIMIT,
    ResilientHistoryStore, StorageDegraded, SyncMode, DEFAULT_CAPACITY,
};
pub use panther_proof::{
    FileGuidelineLoader, GuidelineFallback, GuidelineLoader, NoDefaultGuidelines, ProofBuilder,
    SessionInput, StaticGuidelineLoader, Verification, Verifier,
};
pub use panther_types::{
    AnchorAction, AnchorEvent, ClaimedProof, Digest, Proof, ProviderConfig, SecretPolicy,
    PROOF_SCHEME,
};
