use std::sync::Arc;

use panther_sdk::ProofService;

/// Shared state handed to every handler.
#[derive(Clone)]
pub struct AppState {
    pub service: Arc<ProofService>,
    pub api_key: Option<Arc<str>>,
}

impl AppState {
    pub fn new(service: ProofService) -> Self {
        Self {
            service: Arc::new(service),
            api_key: None,
        }
    }

    pub fn with_api_key(mut self, key: impl Into<Arc<str>>) -> Self {
        self.api_key = Some(key.into());
        self
    }
}
