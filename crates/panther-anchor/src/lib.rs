//! Ledger anchoring for Panther proofs.
//!
//! [`AnchorClient`] is the contract a blockchain client implements: submit a
//! digest, and poll whether it has been recorded. [`AnchorService`] wraps a
//! client with configuration checks, a call timeout and history recording.
//! [`InMemoryLedgerClient`] is a deterministic in-process ledger for
//! development and tests.

pub mod client;
pub mod config;
pub mod error;
pub mod memory;
pub mod service;

pub use client::{AnchorClient, AnchorStatus, AnchorSubmission, LedgerError, LedgerTarget, SigningCredential};
pub use config::{LedgerConfig, DEFAULT_LEDGER_TIMEOUT_MS};
pub use error::{AnchorError, AnchorResult};
pub use memory::InMemoryLedgerClient;
pub use service::{AnchorReceipt, AnchorService, StatusReceipt};
