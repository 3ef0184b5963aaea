use crate::client::LedgerError;

/// Errors from the anchor/status service.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AnchorError {
    /// Required ledger settings are missing. No ledger call was made.
    #[error("ledger not configured: set {}", .missing.join(", "))]
    Configuration { missing: Vec<&'static str> },

    /// No client, a failed call, or a timeout.
    #[error("ledger unavailable: {0}")]
    LedgerUnavailable(String),

    #[error("invalid request: {0}")]
    InvalidRequest(String),
}

impl From<LedgerError> for AnchorError {
    fn from(err: LedgerError) -> Self {
        Self::LedgerUnavailable(err.to_string())
    }
}

pub type AnchorResult<T> = Result<T, AnchorError>;
