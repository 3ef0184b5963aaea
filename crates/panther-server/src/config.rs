use std::fmt;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};

use panther_sdk::{GuidelineFallback, LedgerConfig, SecretPolicy, SyncMode, DEFAULT_CAPACITY};
use serde::{Deserialize, Serialize};

use crate::error::{ServerError, ServerResult};

#[derive(Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub bind_addr: SocketAddr,
    /// When set, every `/proof/*` request must carry it in `X-API-Key`.
    pub api_key: Option<String>,
    pub secret_policy: SecretPolicy,
    /// Wire the in-process ledger instead of leaving anchoring unconfigured.
    pub dev_ledger: bool,
    pub history: HistoryConfig,
    pub guidelines: GuidelineConfig,
    pub ledger: LedgerConfig,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::from(([127, 0, 0, 1], 8000)),
            api_key: None,
            secret_policy: SecretPolicy::default(),
            dev_ledger: false,
            history: HistoryConfig::default(),
            guidelines: GuidelineConfig::default(),
            ledger: LedgerConfig::default(),
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct HistoryConfig {
    /// Durable log location. Memory only when unset.
    pub path: Option<PathBuf>,
    pub sync: SyncMode,
    /// Ring-buffer size for memory-only and degraded operation.
    pub capacity: usize,
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self {
            path: None,
            sync: SyncMode::default(),
            capacity: DEFAULT_CAPACITY,
        }
    }
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct GuidelineConfig {
    /// JSON file holding the default guideline set.
    pub path: Option<PathBuf>,
    pub fallback: GuidelineFallback,
}

impl ServerConfig {
    /// Read a TOML file. Missing sections and fields take their defaults.
    pub fn load(path: impl AsRef<Path>) -> ServerResult<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)?;
        toml::from_str(&text).map_err(|e| ServerError::Config(format!("{}: {e}", path.display())))
    }

    /// Override fields from `PANTHER_*` environment variables.
    pub fn apply_env(&mut self) -> ServerResult<()> {
        self.apply_vars(|name| std::env::var(name).ok())
    }

    /// Override fields from an arbitrary variable source.
    pub fn apply_vars<F>(&mut self, lookup: F) -> ServerResult<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());
        if let Some(addr) = get("PANTHER_BIND_ADDR") {
            self.bind_addr = addr
                .trim()
                .parse()
                .map_err(|e| ServerError::Config(format!("PANTHER_BIND_ADDR={addr}: {e}")))?;
        }
        if let Some(key) = get("PANTHER_API_KEY") {
            self.api_key = Some(key);
        }
        if let Some(path) = get("PANTHER_HISTORY_PATH") {
            self.history.path = Some(PathBuf::from(path));
        }
        if let Some(path) = get("PANTHER_GUIDELINES_PATH") {
            self.guidelines.path = Some(PathBuf::from(path));
        }
        self.ledger.apply_vars(&lookup);
        Ok(())
    }

    /// The configured API key, treating an empty one as absent.
    pub fn required_api_key(&self) -> Option<&str> {
        self.api_key.as_deref().filter(|k| !k.is_empty())
    }
}

impl fmt::Debug for ServerConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ServerConfig")
            .field("bind_addr", &self.bind_addr)
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("secret_policy", &self.secret_policy)
            .field("dev_ledger", &self.dev_ledger)
            .field("history", &self.history)
            .field("guidelines", &self.guidelines)
            .field("ledger", &self.ledger)
            .finish()
    }
}
