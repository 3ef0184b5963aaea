use panther_types::{ClaimedProof, Digest, ProviderConfig};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

use crate::builder::{Commitment, ProofBuilder, SessionInput};
use crate::error::ProofBuildResult;

/// Outcome of checking a claimed proof.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Verification {
    pub valid: bool,
    /// Component digests carried by the claim that disagree with the
    /// recomputation. Only filled in by [`Verifier::verify_detailed`].
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub mismatched: Vec<String>,
}

/// Recomputes proofs from raw session data and compares them with claims.
///
/// Only `combined_hash` decides validity. Comparison is case-insensitive and
/// tolerates a `0x` prefix; a claim that is not a well-formed digest is
/// simply invalid. Verification never touches history or the ledger.
#[derive(Clone, Debug, Default)]
pub struct Verifier {
    builder: ProofBuilder,
}

impl Verifier {
    /// A verifier that resolves guidelines and secrets exactly as `builder`.
    pub fn new(builder: ProofBuilder) -> Self {
        Self { builder }
    }

    pub fn verify(
        &self,
        prompt: &str,
        providers: &[ProviderConfig],
        results: &[Value],
        guidelines: Option<Value>,
        salt: Option<&str>,
        claimed: &ClaimedProof,
    ) -> ProofBuildResult<Verification> {
        let c = self.builder.commit(prompt, providers, results, guidelines, salt)?;
        Ok(Verification {
            valid: check(&c, claimed),
            mismatched: Vec::new(),
        })
    }

    /// Like [`Verifier::verify`], also naming every component digest in the
    /// claim that does not match.
    pub fn verify_detailed(
        &self,
        prompt: &str,
        providers: &[ProviderConfig],
        results: &[Value],
        guidelines: Option<Value>,
        salt: Option<&str>,
        claimed: &ClaimedProof,
    ) -> ProofBuildResult<Verification> {
        let c = self.builder.commit(prompt, providers, results, guidelines, salt)?;
        let components: [(&str, &Option<String>, &Digest); 4] = [
            ("input_hash", &claimed.input_hash, &c.input),
            ("results_hash", &claimed.results_hash, &c.results),
            ("providers_hash", &claimed.providers_hash, &c.providers),
            ("guidelines_hash", &claimed.guidelines_hash, &c.guidelines),
        ];
        let mismatched = components
            .iter()
            .filter_map(|(name, claim, actual)| match claim {
                Some(hex) if !actual.matches_hex(hex) => Some(name.to_string()),
                _ => None,
            })
            .collect();
        Ok(Verification {
            valid: check(&c, claimed),
            mismatched,
        })
    }

    pub fn verify_session(
        &self,
        session: &SessionInput,
        claimed: &ClaimedProof,
    ) -> ProofBuildResult<Verification> {
        self.verify(
            &session.prompt,
            &session.providers,
            &session.results,
            session.guidelines()?,
            session.salt.as_deref(),
            claimed,
        )
    }
}

fn check(c: &Commitment, claimed: &ClaimedProof) -> bool {
    let valid = c.combined.matches_hex(&claimed.combined_hash);
    debug!(combined = %c.combined.short_hex(), valid, "verified claim");
    valid
}
