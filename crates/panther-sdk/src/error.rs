use panther_anchor::AnchorError;
use panther_crypto::EncodingError;
use panther_history::{HistoryError, StorageDegraded};
use panther_proof::{GuidelineUnavailable, ProofBuildError};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ProofError {
    #[error("encoding error: {0}")]
    Encoding(#[from] EncodingError),

    #[error("{0}")]
    Configuration(String),

    #[error("ledger unavailable: {0}")]
    LedgerUnavailable(String),

    #[error(transparent)]
    GuidelineUnavailable(#[from] GuidelineUnavailable),

    #[error(transparent)]
    StorageDegraded(#[from] StorageDegraded),

    #[error("invalid request: {0}")]
    InvalidRequest(String),

    #[error("internal error: {0}")]
    Internal(String),
}

impl ProofError {
    /// Stable, machine-readable error kind.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Encoding(_) => "encoding_error",
            Self::Configuration(_) => "configuration_error",
            Self::LedgerUnavailable(_) => "ledger_unavailable",
            Self::GuidelineUnavailable(_) => "guideline_unavailable",
            Self::StorageDegraded(_) => "storage_degraded",
            Self::InvalidRequest(_) => "invalid_request",
            Self::Internal(_) => "internal",
        }
    }
}

impl From<ProofBuildError> for ProofError {
    fn from(err: ProofBuildError) -> Self {
        match err {
            ProofBuildError::Encoding(e) => Self::Encoding(e),
            ProofBuildError::GuidelineUnavailable(e) => Self::GuidelineUnavailable(e),
        }
    }
}

impl From<AnchorError> for ProofError {
    fn from(err: AnchorError) -> Self {
        match err {
            e @ AnchorError::Configuration { .. } => Self::Configuration(e.to_string()),
            AnchorError::LedgerUnavailable(msg) => Self::LedgerUnavailable(msg),
            AnchorError::InvalidRequest(msg) => Self::InvalidRequest(msg),
        }
    }
}

impl From<HistoryError> for ProofError {
    fn from(err: HistoryError) -> Self {
        match err {
            HistoryError::LockPoisoned => Self::Internal(err.to_string()),
            other => Self::StorageDegraded(StorageDegraded::new(other.to_string())),
        }
    }
}

pub type ProofResult<T> = Result<T, ProofError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kinds_are_stable() {
        let cases: Vec<(ProofError, &str)> = vec![
            (EncodingError::NonFiniteNumber.into(), "encoding_error"),
            (
                AnchorError::Configuration { missing: vec!["PANTHER_ETH_RPC"] }.into(),
                "configuration_error",
            ),
            (AnchorError::LedgerUnavailable("down".into()).into(), "ledger_unavailable"),
            (AnchorError::InvalidRequest("empty".into()).into(), "invalid_request"),
            (GuidelineUnavailable("gone".into()).into(), "guideline_unavailable"),
            (StorageDegraded::new("disk").into(), "storage_degraded"),
            (HistoryError::LockPoisoned.into(), "internal"),
        ];
        for (err, kind) in cases {
            assert_eq!(err.kind(), kind, "{err}");
        }
    }

    #[test]
    fn configuration_message_names_settings() {
        let err: ProofError = AnchorError::Configuration {
            missing: vec!["PANTHER_ETH_RPC", "PANTHER_PROOF_CONTRACT"],
        }
        .into();
        assert_eq!(
            err.to_string(),
            "ledger not configured: set PANTHER_ETH_RPC, PANTHER_PROOF_CONTRACT"
        );
    }

    #[test]
    fn history_io_is_storage_degraded() {
        let err: ProofError = HistoryError::Io(std::io::Error::other("disk")).into();
        assert_eq!(err.kind(), "storage_degraded");
    }
}
