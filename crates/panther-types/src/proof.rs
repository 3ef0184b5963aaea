use serde::{Deserialize, Serialize};

use crate::digest::Digest;

/// Name of the commitment scheme.
///
/// Any change to encoding or composition must ship under a new name.
pub const PROOF_SCHEME: &str = "panther-proof-v1";

/// Commitment over one validation session.
///
/// The five digests are the binding part. `timestamp_ms` and `sdk_version`
/// are metadata and are never compared during verification.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Proof {
    pub scheme: String,
    pub input_hash: Digest,
    pub results_hash: Digest,
    pub combined_hash: Digest,
    pub guidelines_hash: Digest,
    pub providers_hash: Digest,
    pub timestamp_ms: u64,
    pub sdk_version: String,
    pub salt_present: bool,
}

impl Proof {
    /// Returns `true` if both proofs commit to the same session, ignoring
    /// timestamp and SDK version.
    pub fn same_commitment(&self, other: &Proof) -> bool {
        self.scheme == other.scheme
            && self.input_hash == other.input_hash
            && self.results_hash == other.results_hash
            && self.combined_hash == other.combined_hash
            && self.guidelines_hash == other.guidelines_hash
            && self.providers_hash == other.providers_hash
            && self.salt_present == other.salt_present
    }
}

/// A proof as presented by someone asking for verification.
///
/// Only `combined_hash` is required. The hashes are kept as raw strings:
/// a malformed claim is not a parse error, it just fails verification.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClaimedProof {
    #[serde(default)]
    pub combined_hash: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scheme: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub input_hash: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub results_hash: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub providers_hash: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub guidelines_hash: Option<String>,
}

impl ClaimedProof {
    /// A claim carrying nothing but the combined hash.
    pub fn combined(hash: impl Into<String>) -> Self {
        Self {
            combined_hash: hash.into(),
            ..Self::default()
        }
    }
}

impl From<&Proof> for ClaimedProof {
    fn from(proof: &Proof) -> Self {
        Self {
            combined_hash: proof.combined_hash.to_hex(),
            scheme: Some(proof.scheme.clone()),
            input_hash: Some(proof.input_hash.to_hex()),
            results_hash: Some(proof.results_hash.to_hex()),
            providers_hash: Some(proof.providers_hash.to_hex()),
            guidelines_hash: Some(proof.guidelines_hash.to_hex()),
        }
    }
}
