use std::future::Future;
use std::sync::Arc;

use panther_history::{HistoryError, ProofHistoryStore};
use panther_types::{normalize_hash, now_ms, AnchorEvent};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::client::{AnchorClient, LedgerError};
use crate::config::LedgerConfig;
use crate::error::{AnchorError, AnchorResult};

/// Result of a successful anchoring call.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnchorReceipt {
    pub tx_hash: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub explorer_url: Option<String>,
    /// The event could not be written to durable history.
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub storage_degraded: bool,
}

/// Result of a successful status poll.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusReceipt {
    pub anchored: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub contract_url: Option<String>,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub storage_degraded: bool,
}

/// Anchors digests on the configured ledger and records every completed
/// call in history.
///
/// Configuration is checked before any ledger call. The history write
/// happens after the call returns, so a slow ledger never holds the
/// history lock. A failed or timed-out call records nothing. Calls are
/// never retried.
pub struct AnchorService {
    config: LedgerConfig,
    client: Option<Arc<dyn AnchorClient>>,
    history: Arc<dyn ProofHistoryStore>,
}

impl AnchorService {
    pub fn new(config: LedgerConfig, history: Arc<dyn ProofHistoryStore>) -> Self {
        Self {
            config,
            client: None,
            history,
        }
    }

    pub fn with_client(mut self, client: Arc<dyn AnchorClient>) -> Self {
        self.client = Some(client);
        self
    }

    pub fn config(&self) -> &LedgerConfig {
        &self.config
    }

    pub fn history(&self) -> &Arc<dyn ProofHistoryStore> {
        &self.history
    }

    /// Submit `hash` to the ledger.
    pub async fn anchor(&self, hash: &str) -> AnchorResult<AnchorReceipt> {
        let hash = require_hash(hash)?;
        let (target, credential) = self.config.require_anchor()?;
        let client = self.client()?;

        let submission = self.call(client.anchor(&target, &credential, &hash)).await?;
        let explorer_url = self.config.explorer_tx_url(&submission.tx_hash);
        info!(hash = %hash, tx_hash = %submission.tx_hash, "anchored proof");

        let storage_degraded = self
            .record(AnchorEvent::anchor(
                now_ms(),
                hash,
                submission.tx_hash.clone(),
                explorer_url.clone(),
            ))
            .await;
        Ok(AnchorReceipt {
            tx_hash: submission.tx_hash,
            explorer_url,
            storage_degraded,
        })
    }

    /// Ask the ledger whether `hash` has been anchored.
    pub async fn status(&self, hash: &str) -> AnchorResult<StatusReceipt> {
        let hash = require_hash(hash)?;
        let target = self.config.require_status()?;
        let client = self.client()?;

        let status = self.call(client.check_status(&target, &hash)).await?;
        let contract_url = self.config.contract_url();
        info!(hash = %hash, anchored = status.anchored, "checked anchor status");

        let storage_degraded = self
            .record(AnchorEvent::status(
                now_ms(),
                hash,
                status.anchored,
                contract_url.clone(),
            ))
            .await;
        Ok(StatusReceipt {
            anchored: status.anchored,
            contract_url,
            storage_degraded,
        })
    }

    fn client(&self) -> AnchorResult<&Arc<dyn AnchorClient>> {
        self.client
            .as_ref()
            .ok_or_else(|| AnchorError::LedgerUnavailable("no ledger client configured".into()))
    }

    async fn call<T, F>(&self, fut: F) -> AnchorResult<T>
    where
        F: Future<Output = Result<T, LedgerError>>,
    {
        let outcome = match self.config.timeout() {
            Some(limit) => tokio::time::timeout(limit, fut).await.map_err(|_| {
                AnchorError::LedgerUnavailable(format!(
                    "ledger call timed out after {}ms",
                    self.config.timeout_ms
                ))
            })?,
            None => fut.await,
        };
        outcome.map_err(|e| {
            warn!(error = %e, "ledger call failed");
            AnchorError::from(e)
        })
    }

    /// Append to history on the blocking pool; durable stores may fsync.
    /// Returns `true` when the event did not reach durable storage.
    async fn record(&self, event: AnchorEvent) -> bool {
        let history = Arc::clone(&self.history);
        let outcome = tokio::task::spawn_blocking(move || {
            history.append(event)?;
            Ok::<_, HistoryError>(history.degraded().is_some())
        })
        .await;
        match outcome {
            Ok(Ok(degraded)) => degraded,
            Ok(Err(e)) => {
                warn!(error = %e, "failed to record anchor event");
                true
            }
            Err(e) => {
                warn!(error = %e, "history append task did not complete");
                true
            }
        }
    }
}

fn require_hash(hash: &str) -> AnchorResult<String> {
    let hash = normalize_hash(hash);
    if hash.is_empty() {
        return Err(AnchorError::InvalidRequest("missing 'hash' (combined_hash)".into()));
    }
    Ok(hash)
}
