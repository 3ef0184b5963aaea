use std::fmt;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Where a digest is anchored: an RPC endpoint and the contract behind it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LedgerTarget {
    pub rpc_url: String,
    pub contract_address: String,
}

/// Key used to sign anchoring transactions. Never printed.
#[derive(Clone, PartialEq, Eq)]
pub struct SigningCredential(String);

impl SigningCredential {
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for SigningCredential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SigningCredential(<redacted>)")
    }
}

/// A submitted anchoring transaction.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnchorSubmission {
    pub tx_hash: String,
}

/// Whether the ledger has recorded a digest.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnchorStatus {
    pub anchored: bool,
}

/// Failures reported by a ledger client.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LedgerError {
    #[error("ledger unreachable: {0}")]
    Unreachable(String),

    #[error("transaction rejected: {0}")]
    Rejected(String),
}

/// Contract for the external ledger client.
///
/// `anchor` is not idempotent: every call may submit a new transaction, so
/// callers must not retry it blindly.
#[async_trait]
pub trait AnchorClient: Send + Sync {
    async fn anchor(
        &self,
        target: &LedgerTarget,
        credential: &SigningCredential,
        hash: &str,
    ) -> Result<AnchorSubmission, LedgerError>;

    async fn check_status(
        &self,
        target: &LedgerTarget,
        hash: &str,
    ) -> Result<AnchorStatus, LedgerError>;
}
