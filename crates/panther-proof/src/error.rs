use panther_crypto::EncodingError;

use crate::guidelines::GuidelineUnavailable;

/// Errors from computing or verifying a proof.
#[derive(Debug, Clone, thiserror::Error, PartialEq, Eq)]
pub enum ProofBuildError {
    #[error("encoding error: {0}")]
    Encoding(#[from] EncodingError),

    #[error(transparent)]
    GuidelineUnavailable(#[from] GuidelineUnavailable),
}

pub type ProofBuildResult<T> = Result<T, ProofBuildError>;
