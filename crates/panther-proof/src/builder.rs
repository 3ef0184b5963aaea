use std::fmt;
use std::sync::Arc;

use panther_crypto::{CanonicalEncoder, EncodingError, HashEngine};
use panther_types::{now_ms, Digest, Proof, ProviderConfig, SecretPolicy, PROOF_SCHEME};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::{debug, warn};

use crate::error::ProofBuildResult;
use crate::guidelines::{GuidelineFallback, GuidelineLoader, GuidelineUnavailable, NoDefaultGuidelines};

/// SDK version stamped on every proof.
pub const SDK_VERSION: &str = env!("CARGO_PKG_VERSION");

/// A validation session as it arrives at the boundary.
///
/// Guidelines travel as JSON *text*; use [`SessionInput::guidelines`] to get
/// the parsed document.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct SessionInput {
    pub prompt: String,
    #[serde(default)]
    pub providers: Vec<ProviderConfig>,
    #[serde(default)]
    pub results: Vec<Value>,
    #[serde(default)]
    pub guidelines_json: Option<String>,
    #[serde(default)]
    pub salt: Option<String>,
}

impl SessionInput {
    /// The supplied guideline document, if any.
    pub fn guidelines(&self) -> Result<Option<Value>, EncodingError> {
        parse_guidelines_text(self.guidelines_json.as_deref())
    }
}

/// Parse guideline text supplied by a caller.
///
/// Missing, empty and whitespace-only text all mean "not supplied".
pub fn parse_guidelines_text(text: Option<&str>) -> Result<Option<Value>, EncodingError> {
    match text.map(str::trim) {
        None | Some("") => Ok(None),
        Some(t) => CanonicalEncoder::parse(t).map(Some),
    }
}

/// The five digests of a session.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct Commitment {
    pub input: Digest,
    pub results: Digest,
    pub combined: Digest,
    pub providers: Digest,
    pub guidelines: Digest,
    pub salt_present: bool,
}

/// Computes proofs over validation sessions.
///
/// Computation is pure apart from the timestamp: the same logical inputs
/// always yield the same five digests.
#[derive(Clone)]
pub struct ProofBuilder {
    loader: Arc<dyn GuidelineLoader>,
    fallback: GuidelineFallback,
    secret_policy: SecretPolicy,
}

impl Default for ProofBuilder {
    fn default() -> Self {
        Self::new(Arc::new(NoDefaultGuidelines))
    }
}

impl fmt::Debug for ProofBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProofBuilder")
            .field("fallback", &self.fallback)
            .field("secret_policy", &self.secret_policy)
            .finish_non_exhaustive()
    }
}

impl ProofBuilder {
    pub fn new(loader: Arc<dyn GuidelineLoader>) -> Self {
        Self {
            loader,
            fallback: GuidelineFallback::default(),
            secret_policy: SecretPolicy::default(),
        }
    }

    pub fn with_fallback(mut self, fallback: GuidelineFallback) -> Self {
        self.fallback = fallback;
        self
    }

    pub fn with_secret_policy(mut self, policy: SecretPolicy) -> Self {
        self.secret_policy = policy;
        self
    }

    pub fn fallback(&self) -> GuidelineFallback {
        self.fallback
    }

    pub fn secret_policy(&self) -> SecretPolicy {
        self.secret_policy
    }

    /// The loader's default guideline document, without any fallback.
    pub fn default_guidelines(&self) -> Result<Value, GuidelineUnavailable> {
        self.loader.load_default()
    }

    /// Compute the proof for one session.
    pub fn compute(
        &self,
        prompt: &str,
        providers: &[ProviderConfig],
        results: &[Value],
        guidelines: Option<Value>,
        salt: Option<&str>,
    ) -> ProofBuildResult<Proof> {
        let c = self.commit(prompt, providers, results, guidelines, salt)?;
        debug!(combined = %c.combined.short_hex(), salt_present = c.salt_present, "computed proof");
        Ok(Proof {
            scheme: PROOF_SCHEME.to_string(),
            input_hash: c.input,
            results_hash: c.results,
            combined_hash: c.combined,
            guidelines_hash: c.guidelines,
            providers_hash: c.providers,
            timestamp_ms: now_ms(),
            sdk_version: SDK_VERSION.to_string(),
            salt_present: c.salt_present,
        })
    }

    /// Compute the proof for a session received at the boundary.
    pub fn compute_session(&self, session: &SessionInput) -> ProofBuildResult<Proof> {
        self.compute(
            &session.prompt,
            &session.providers,
            &session.results,
            session.guidelines()?,
            session.salt.as_deref(),
        )
    }

    pub(crate) fn commit(
        &self,
        prompt: &str,
        providers: &[ProviderConfig],
        results: &[Value],
        guidelines: Option<Value>,
        salt: Option<&str>,
    ) -> ProofBuildResult<Commitment> {
        let guidelines = self.resolve_guidelines(guidelines)?;
        let providers = ProviderConfig::hashed_list(providers, self.secret_policy);

        let providers_hash = HashEngine::digest_canonical(&providers)?;
        let guidelines_hash = HashEngine::digest_canonical(&guidelines)?;

        let bundle = json!({
            "prompt": prompt,
            "providers": providers,
            "guidelines": guidelines,
            "salt": salt,
        });
        let input = HashEngine::digest_canonical(&bundle)?;
        let results = HashEngine::digest_canonical(&Value::Array(results.to_vec()))?;
        let combined = HashEngine::compose(&input, &results);

        Ok(Commitment {
            input,
            results,
            combined,
            providers: providers_hash,
            guidelines: guidelines_hash,
            salt_present: salt.is_some_and(|s| !s.is_empty()),
        })
    }

    fn resolve_guidelines(&self, supplied: Option<Value>) -> Result<Value, GuidelineUnavailable> {
        if let Some(doc) = supplied {
            return Ok(doc);
        }
        match self.loader.load_default() {
            Ok(doc) => Ok(doc),
            Err(err) => match self.fallback {
                GuidelineFallback::EmptyList => {
                    warn!(error = %err, "default guidelines unavailable, hashing empty list");
                    Ok(Value::Array(Vec::new()))
                }
                GuidelineFallback::Fail => Err(err),
            },
        }
    }
}
