use std::fmt;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::client::{LedgerTarget, SigningCredential};
use crate::error::{AnchorError, AnchorResult};

/// Ledger call timeout used unless configured otherwise.
pub const DEFAULT_LEDGER_TIMEOUT_MS: u64 = 30_000;

const ENV_RPC: &str = "PANTHER_ETH_RPC";
const ENV_CONTRACT: &str = "PANTHER_PROOF_CONTRACT";
const ENV_KEY: &str = "PANTHER_ETH_PRIVKEY";
const ENV_EXPLORER: &str = "PANTHER_EXPLORER_BASE";
const ENV_TIMEOUT: &str = "PANTHER_LEDGER_TIMEOUT_MS";

/// Ledger connection settings.
///
/// Empty strings count as unset. A `timeout_ms` of zero disables the call
/// timeout.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LedgerConfig {
    pub rpc_url: Option<String>,
    pub contract_address: Option<String>,
    pub signing_key: Option<String>,
    pub explorer_base: Option<String>,
    pub timeout_ms: u64,
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            rpc_url: None,
            contract_address: None,
            signing_key: None,
            explorer_base: None,
            timeout_ms: DEFAULT_LEDGER_TIMEOUT_MS,
        }
    }
}

impl LedgerConfig {
    /// Defaults overridden by the process environment.
    pub fn from_env() -> Self {
        let mut config = Self::default();
        config.apply_env();
        config
    }

    /// Override fields from `PANTHER_*` environment variables.
    pub fn apply_env(&mut self) {
        self.apply_vars(|name| std::env::var(name).ok());
    }

    /// Override fields from an arbitrary variable source.
    pub fn apply_vars<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());
        if let Some(v) = get(ENV_RPC) {
            self.rpc_url = Some(v);
        }
        if let Some(v) = get(ENV_CONTRACT) {
            self.contract_address = Some(v);
        }
        if let Some(v) = get(ENV_KEY) {
            self.signing_key = Some(v);
        }
        if let Some(v) = get(ENV_EXPLORER) {
            self.explorer_base = Some(v);
        }
        if let Some(ms) = get(ENV_TIMEOUT).and_then(|v| v.trim().parse().ok()) {
            self.timeout_ms = ms;
        }
    }

    pub fn with_rpc_url(mut self, url: impl Into<String>) -> Self {
        self.rpc_url = Some(url.into());
        self
    }

    pub fn with_contract_address(mut self, address: impl Into<String>) -> Self {
        self.contract_address = Some(address.into());
        self
    }

    pub fn with_signing_key(mut self, key: impl Into<String>) -> Self {
        self.signing_key = Some(key.into());
        self
    }

    pub fn with_explorer_base(mut self, base: impl Into<String>) -> Self {
        self.explorer_base = Some(base.into());
        self
    }

    pub fn with_timeout_ms(mut self, ms: u64) -> Self {
        self.timeout_ms = ms;
        self
    }

    /// Call timeout, or `None` when disabled.
    pub fn timeout(&self) -> Option<Duration> {
        (self.timeout_ms > 0).then(|| Duration::from_millis(self.timeout_ms))
    }

    /// Everything needed to submit a transaction.
    pub fn require_anchor(&self) -> AnchorResult<(LedgerTarget, SigningCredential)> {
        let mut missing = self.missing_target();
        let key = set(&self.signing_key);
        if key.is_none() {
            missing.push(ENV_KEY);
        }
        match (self.target(), key) {
            (Some(target), Some(key)) if missing.is_empty() => {
                Ok((target, SigningCredential::new(key)))
            }
            _ => Err(AnchorError::Configuration { missing }),
        }
    }

    /// Everything needed to poll status.
    pub fn require_status(&self) -> AnchorResult<LedgerTarget> {
        self.target().ok_or_else(|| AnchorError::Configuration {
            missing: self.missing_target(),
        })
    }

    /// `<explorer>/tx/<tx_hash>` when an explorer is configured.
    pub fn explorer_tx_url(&self, tx_hash: &str) -> Option<String> {
        set(&self.explorer_base).map(|base| format!("{}/tx/{tx_hash}", base.trim_end_matches('/')))
    }

    /// `<explorer>/address/<contract>` when both are configured.
    pub fn contract_url(&self) -> Option<String> {
        let base = set(&self.explorer_base)?;
        let contract = set(&self.contract_address)?;
        Some(format!("{}/address/{contract}", base.trim_end_matches('/')))
    }

    fn target(&self) -> Option<LedgerTarget> {
        Some(LedgerTarget {
            rpc_url: set(&self.rpc_url)?.to_string(),
            contract_address: set(&self.contract_address)?.to_string(),
        })
    }

    fn missing_target(&self) -> Vec<&'static str> {
        let mut missing = Vec::new();
        if set(&self.rpc_url).is_none() {
            missing.push(ENV_RPC);
        }
        if set(&self.contract_address).is_none() {
            missing.push(ENV_CONTRACT);
        }
        missing
    }
}

fn set(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

impl fmt::Debug for LedgerConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LedgerConfig")
            .field("rpc_url", &self.rpc_url)
            .field("contract_address", &self.contract_address)
            .field("signing_key", &self.signing_key.as_ref().map(|_| "<redacted>"))
            .field("explorer_base", &self.explorer_base)
            .field("timeout_ms", &self.timeout_ms)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn full() -> LedgerConfig {
        LedgerConfig::default()
            .with_rpc_url("http://rpc")
            .with_contract_address("0xC0FFEE")
            .with_signing_key("0xkey")
    }

    #[test]
    fn defaults() {
        let c = LedgerConfig::default();
        assert_eq!(c.timeout_ms, DEFAULT_LEDGER_TIMEOUT_MS);
        assert_eq!(c.timeout(), Some(Duration::from_secs(30)));
        assert_eq!(c.with_timeout_ms(0).timeout(), None);
    }

    #[test]
    fn env_overrides() {
        let vars: HashMap<&str, &str> = [
            ("PANTHER_ETH_RPC", "http://rpc"),
            ("PANTHER_PROOF_CONTRACT", "0xabc"),
            ("PANTHER_ETH_PRIVKEY", "0xkey"),
            ("PANTHER_EXPLORER_BASE", "https://scan.example/"),
            ("PANTHER_LEDGER_TIMEOUT_MS", "1500"),
        ]
        .into_iter()
        .collect();
        let mut c = LedgerConfig::default();
        c.apply_vars(|k| vars.get(k).map(|v| v.to_string()));
        assert_eq!(c.rpc_url.as_deref(), Some("http://rpc"));
        assert_eq!(c.timeout_ms, 1500);
        assert_eq!(c.contract_url().as_deref(), Some("https://scan.example/address/0xabc"));
    }

    #[test]
    fn empty_env_values_do_not_override() {
        let mut c = full();
        c.apply_vars(|_| Some(String::new()));
        assert_eq!(c, full());
    }

    #[test]
    fn require_anchor_names_missing_settings() {
        let err = LedgerConfig::default().require_anchor().unwrap_err();
        assert_eq!(
            err,
            AnchorError::Configuration {
                missing: vec!["PANTHER_ETH_RPC", "PANTHER_PROOF_CONTRACT", "PANTHER_ETH_PRIVKEY"]
            }
        );
        assert!(err.to_string().contains("PANTHER_ETH_PRIVKEY"));

        let no_key = LedgerConfig::default()
            .with_rpc_url("http://rpc")
            .with_contract_address("0xabc");
        assert_eq!(
            no_key.require_anchor().unwrap_err(),
            AnchorError::Configuration { missing: vec!["PANTHER_ETH_PRIVKEY"] }
        );
        assert!(no_key.require_status().is_ok());
    }

    #[test]
    fn require_anchor_ok() {
        let (target, cred) = full().require_anchor().unwrap();
        assert_eq!(target.contract_address, "0xC0FFEE");
        assert_eq!(cred.expose(), "0xkey");
    }

    #[test]
    fn blank_values_count_as_missing() {
        let c = full().with_rpc_url("  ");
        assert!(matches!(c.require_status(), Err(AnchorError::Configuration { .. })));
    }

    #[test]
    fn explorer_urls() {
        let c = full().with_explorer_base("https://scan.example//");
        assert_eq!(
            c.explorer_tx_url("0x12").as_deref(),
            Some("https://scan.example/tx/0x12")
        );
        assert_eq!(full().explorer_tx_url("0x12"), None);
    }

    #[test]
    fn debug_redacts_signing_key() {
        assert!(!format!("{:?}", full()).contains("0xkey"));
    }

    #[test]
    fn deserializes_partial_config() {
        let c: LedgerConfig = serde_json::from_str(r#"{"rpc_url": "http://rpc"}"#).unwrap();
        assert_eq!(c.rpc_url.as_deref(), Some("http://rpc"));
        assert_eq!(c.timeout_ms, DEFAULT_LEDGER_TIMEOUT_MS);
    }
}
