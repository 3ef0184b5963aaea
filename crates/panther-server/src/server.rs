use std::sync::Arc;

use panther_sdk::{
    AnchorClient, AnchorService, FileGuidelineLoader, GuidelineLoader, InMemoryLedgerClient,
    NoDefaultGuidelines, ProofBuilder, ProofHistoryStore, ProofService, ResilientHistoryStore,
};
use tokio::net::TcpListener;
use tracing::{info, warn};

use crate::config::ServerConfig;
use crate::error::{ServerError, ServerResult};
use crate::router::build_router;
use crate::state::AppState;

/// Panther proof server.
pub struct ProofServer {
    config: ServerConfig,
    client: Option<Arc<dyn AnchorClient>>,
}

impl ProofServer {
    pub fn new(config: ServerConfig) -> Self {
        Self {
            config,
            client: None,
        }
    }

    /// Use `client` for anchoring instead of whatever the config selects.
    pub fn with_ledger_client(mut self, client: Arc<dyn AnchorClient>) -> Self {
        self.client = Some(client);
        self
    }

    pub fn config(&self) -> &ServerConfig {
        &self.config
    }

    /// Assemble the proof service described by the config.
    pub fn build_service(&self) -> ProofService {
        let history: Arc<dyn ProofHistoryStore> = match &self.config.history.path {
            Some(path) => Arc::new(ResilientHistoryStore::open(
                path,
                self.config.history.sync,
                self.config.history.capacity,
            )),
            None => Arc::new(ResilientHistoryStore::memory(self.config.history.capacity)),
        };
        if let Some(degraded) = history.degraded() {
            warn!(reason = %degraded.reason, "starting with degraded history storage");
        }

        let loader: Arc<dyn GuidelineLoader> = match &self.config.guidelines.path {
            Some(path) => Arc::new(FileGuidelineLoader::new(path)),
            None => Arc::new(NoDefaultGuidelines),
        };
        let builder = ProofBuilder::new(loader)
            .with_fallback(self.config.guidelines.fallback)
            .with_secret_policy(self.config.secret_policy);

        let mut anchor = AnchorService::new(self.config.ledger.clone(), history);
        let client = self.client.clone().or_else(|| {
            self.config
                .dev_ledger
                .then(|| Arc::new(InMemoryLedgerClient::new()) as Arc<dyn AnchorClient>)
        });
        if let Some(client) = client {
            anchor = anchor.with_client(client);
        }

        ProofService::new(builder, anchor)
    }

    /// Build the router (useful for testing).
    pub fn router(&self) -> axum::Router {
        let mut state = AppState::new(self.build_service());
        if let Some(key) = self.config.required_api_key() {
            state = state.with_api_key(key);
        }
        build_router(state)
    }

    /// Start serving requests until Ctrl-C.
    pub async fn serve(self) -> ServerResult<()> {
        let app = self.router();
        let listener = TcpListener::bind(self.config.bind_addr).await?;
        info!(
            addr = %self.config.bind_addr,
            auth = self.config.required_api_key().is_some(),
            "panther proof server listening"
        );
        axum::serve(listener, app)
            .with_graceful_shutdown(async {
                let _ = tokio::signal::ctrl_c().await;
            })
            .await
            .map_err(|e| ServerError::Internal(e.to_string()))
    }
}
