use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::RwLock;
use std::time::Duration;

use async_trait::async_trait;
use panther_types::digest::strip_hex_prefix;
use sha3::{Digest as Sha3Digest, Keccak256};
use tracing::debug;

use crate::client::{
    AnchorClient, AnchorStatus, AnchorSubmission, LedgerError, LedgerTarget, SigningCredential,
};

/// Deterministic in-process ledger.
///
/// Transaction hashes are `0x` + Keccak-256 of the digest and a running
/// nonce, so repeated submissions of the same digest get distinct hashes.
/// Digests are matched case-insensitively and without `0x`.
pub struct InMemoryLedgerClient {
    anchored: RwLock<HashMap<(String, String), String>>,
    nonce: AtomicU64,
    calls: AtomicU64,
    online: AtomicBool,
    latency: Option<Duration>,
}

impl InMemoryLedgerClient {
    pub fn new() -> Self {
        Self {
            anchored: RwLock::new(HashMap::new()),
            nonce: AtomicU64::new(0),
            calls: AtomicU64::new(0),
            online: AtomicBool::new(true),
            latency: None,
        }
    }

    /// Delay every call by `latency` before answering.
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = Some(latency);
        self
    }

    /// Simulate the ledger going away (`false`) or coming back (`true`).
    pub fn set_online(&self, online: bool) {
        self.online.store(online, Ordering::SeqCst);
    }

    /// Number of calls received, successful or not.
    pub fn calls(&self) -> u64 {
        self.calls.load(Ordering::SeqCst)
    }

    /// Transaction that anchored `hash` on `contract`, if any.
    pub fn transaction_for(&self, contract: &str, hash: &str) -> Option<String> {
        let key = (contract.to_string(), normalize(hash));
        self.anchored.read().ok()?.get(&key).cloned()
    }

    async fn enter(&self) -> Result<(), LedgerError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(latency) = self.latency {
            tokio::time::sleep(latency).await;
        }
        if !self.online.load(Ordering::SeqCst) {
            return Err(LedgerError::Unreachable("in-memory ledger offline".into()));
        }
        Ok(())
    }
}

impl Default for InMemoryLedgerClient {
    fn default() -> Self {
        Self::new()
    }
}

fn normalize(hash: &str) -> String {
    strip_hex_prefix(hash.trim()).to_ascii_lowercase()
}

#[async_trait]
impl AnchorClient for InMemoryLedgerClient {
    async fn anchor(
        &self,
        target: &LedgerTarget,
        _credential: &SigningCredential,
        hash: &str,
    ) -> Result<AnchorSubmission, LedgerError> {
        self.enter().await?;

        let nonce = self.nonce.fetch_add(1, Ordering::SeqCst);
        let mut hasher = Keccak256::new();
        hasher.update(hash.as_bytes());
        hasher.update(nonce.to_le_bytes());
        let tx_hash = format!("0x{}", hex::encode(hasher.finalize()));

        let mut anchored = self
            .anchored
            .write()
            .map_err(|_| LedgerError::Rejected("ledger state poisoned".into()))?;
        anchored.insert(
            (target.contract_address.clone(), normalize(hash)),
            tx_hash.clone(),
        );
        debug!(%tx_hash, nonce, "in-memory anchor");
        Ok(AnchorSubmission { tx_hash })
    }

    async fn check_status(
        &self,
        target: &LedgerTarget,
        hash: &str,
    ) -> Result<AnchorStatus, LedgerError> {
        self.enter().await?;
        let anchored = self
            .anchored
            .read()
            .map_err(|_| LedgerError::Rejected("ledger state poisoned".into()))?
            .contains_key(&(target.contract_address.clone(), normalize(hash)));
        Ok(AnchorStatus { anchored })
    }
}
