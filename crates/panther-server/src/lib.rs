//! HTTP server for Panther proofs.
//!
//! Exposes the proof service over JSON: compute, anchor, status, history and
//! verify under `/proof/*`, plus `/health`. Every failure answers with
//! `{"error": {"kind", "message"}}` and a status code derived from the kind.
//! An optional shared API key guards everything but `/health`.

pub mod auth;
pub mod config;
pub mod error;
pub mod handler;
pub mod router;
pub mod server;
pub mod state;

pub use auth::API_KEY_HEADER;
pub use config::{GuidelineConfig, HistoryConfig, ServerConfig};
pub use error::{ServerError, ServerResult};
pub use server::ProofServer;
pub use state::AppState;
