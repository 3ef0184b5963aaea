//! Foundation types for Panther validation proofs.
//!
//! This crate provides the typed schema that crosses the proof boundary.
//! Every other Panther crate depends on `panther-types`.
//!
//! # Key Types
//!
//! - [`Digest`]: SHA3-512 digest, rendered as 128 lowercase hex characters
//! - [`ProviderConfig`]: LLM provider configuration bound into the commitment
//! - [`Proof`]: the commitment record produced for a validation session
//! - [`ClaimedProof`]: a proof presented by a third party for verification
//! - [`AnchorEvent`]: one entry of the append-only anchor/status history

pub mod digest;
pub mod error;
pub mod event;
pub mod proof;
pub mod provider;
pub mod temporal;

pub use digest::{normalize_hash, Digest};
pub use error::TypeError;
pub use event::{AnchorAction, AnchorEvent};
pub use proof::{ClaimedProof, Proof, PROOF_SCHEME};
pub use provider::{ProviderConfig, SecretPolicy};
pub use temporal::now_ms;
