use std::sync::Arc;

use panther_anchor::{AnchorReceipt, AnchorService, LedgerConfig, StatusReceipt};
use panther_history::{HistoryQuery, InMemoryHistoryStore, ProofHistoryStore, StorageDegraded};
use panther_proof::{parse_guidelines_text, ProofBuilder, SessionInput, Verification, Verifier};
use panther_types::{AnchorEvent, ClaimedProof, Proof, ProviderConfig};
use serde_json::Value;
use tracing::debug;

use crate::error::ProofResult;

/// Unified API over proof computation, verification, anchoring and history.
///
/// The builder and verifier share one guideline loader, fallback policy and
/// secret policy, so a proof computed here always verifies here.
pub struct ProofService {
    builder: ProofBuilder,
    verifier: Verifier,
    anchor: AnchorService,
}

impl ProofService {
    pub fn new(builder: ProofBuilder, anchor: AnchorService) -> Self {
        Self {
            verifier: Verifier::new(builder.clone()),
            builder,
            anchor,
        }
    }

    /// Default builder, ring-buffer history, no ledger configured.
    pub fn in_memory() -> Self {
        let history: Arc<dyn ProofHistoryStore> = Arc::new(InMemoryHistoryStore::new());
        Self::new(
            ProofBuilder::default(),
            AnchorService::new(LedgerConfig::default(), history),
        )
    }

    pub fn builder(&self) -> &ProofBuilder {
        &self.builder
    }

    pub fn anchor_service(&self) -> &AnchorService {
        &self.anchor
    }

    /// Compute a proof. Guidelines arrive as JSON text.
    pub fn compute(
        &self,
        prompt: &str,
        providers: &[ProviderConfig],
        results: &[Value],
        guidelines_json: Option<&str>,
        salt: Option<&str>,
    ) -> ProofResult<Proof> {
        let guidelines = parse_guidelines_text(guidelines_json)?;
        Ok(self.builder.compute(prompt, providers, results, guidelines, salt)?)
    }

    pub fn compute_session(&self, session: &SessionInput) -> ProofResult<Proof> {
        Ok(self.builder.compute_session(session)?)
    }

    pub async fn anchor(&self, hash: &str) -> ProofResult<AnchorReceipt> {
        Ok(self.anchor.anchor(hash).await?)
    }

    pub async fn status(&self, hash: &str) -> ProofResult<StatusReceipt> {
        Ok(self.anchor.status(hash).await?)
    }

    /// Recompute and compare with `proof`.
    pub fn verify(
        &self,
        prompt: &str,
        providers: &[ProviderConfig],
        results: &[Value],
        guidelines_json: Option<&str>,
        salt: Option<&str>,
        proof: &ClaimedProof,
    ) -> ProofResult<Verification> {
        let guidelines = parse_guidelines_text(guidelines_json)?;
        Ok(self
            .verifier
            .verify(prompt, providers, results, guidelines, salt, proof)?)
    }

    /// Verify a boundary session, naming mismatched component digests.
    pub fn verify_session(
        &self,
        session: &SessionInput,
        proof: &ClaimedProof,
    ) -> ProofResult<Verification> {
        Ok(self.verifier.verify_detailed(
            &session.prompt,
            &session.providers,
            &session.results,
            session.guidelines()?,
            session.salt.as_deref(),
            proof,
        )?)
    }

    /// The configured default guideline document.
    pub fn default_guidelines(&self) -> ProofResult<Value> {
        Ok(self.builder.default_guidelines()?)
    }

    /// Anchor/status events, newest first. `limit` is clamped to `[0, 1000]`.
    pub fn history(&self, hash: Option<&str>, limit: i64) -> ProofResult<Vec<AnchorEvent>> {
        let query = HistoryQuery::new(hash.map(str::to_string), limit);
        let events = self.anchor.history().query(&query)?;
        debug!(hash = ?query.hash(), limit = query.limit(), returned = events.len(), "history query");
        Ok(events)
    }

    /// Why durable history is unavailable, if it is.
    pub fn storage_degraded(&self) -> Option<StorageDegraded> {
        self.anchor.history().degraded()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use panther_anchor::InMemoryLedgerClient;
    use panther_proof::StaticGuidelineLoader;
    use panther_types::AnchorAction;
    use serde_json::json;

    fn configured() -> ProofService {
        let history: Arc<dyn ProofHistoryStore> = Arc::new(InMemoryHistoryStore::new());
        let config = LedgerConfig::default()
            .with_rpc_url("mem://")
            .with_contract_address("0xC0")
            .with_signing_key("0xkey")
            .with_explorer_base("https://scan.example");
        let anchor = AnchorService::new(config, history)
            .with_client(Arc::new(InMemoryLedgerClient::new()));
        ProofService::new(ProofBuilder::default(), anchor)
    }

    #[test]
    fn compute_then_verify() {
        let svc = ProofService::in_memory();
        let providers = vec![ProviderConfig::new("openai").with_model("gpt-4o-mini")];
        let results = vec![json!({"provider_name": "openai", "adherence_score": 90})];
        let proof = svc
            .compute("q", &providers, &results, Some(r#"[{"topic":"x"}]"#), Some("s"))
            .unwrap();
        let claim = ClaimedProof::from(&proof);
        let ok = svc
            .verify("q", &providers, &results, Some(r#"[{"topic":"x"}]"#), Some("s"), &claim)
            .unwrap();
        assert!(ok.valid);

        let tampered = vec![json!({"provider_name": "openai", "adherence_score": 91})];
        let bad = svc
            .verify("q", &providers, &tampered, Some(r#"[{"topic":"x"}]"#), Some("s"), &claim)
            .unwrap();
        assert!(!bad.valid);
    }

    #[test]
    fn invalid_guideline_text_is_encoding_error() {
        let err = ProofService::in_memory()
            .compute("q", &[], &[], Some("{nope"), None)
            .unwrap_err();
        assert_eq!(err.kind(), "encoding_error");
    }

    #[test]
    fn guideline_policy_is_shared_with_verifier() {
        let loader = Arc::new(StaticGuidelineLoader::new(json!(["rule"])));
        let history: Arc<dyn ProofHistoryStore> = Arc::new(InMemoryHistoryStore::new());
        let svc = ProofService::new(
            ProofBuilder::new(loader),
            AnchorService::new(LedgerConfig::default(), history),
        );
        let proof = svc.compute("q", &[], &[], None, None).unwrap();
        let v = svc.verify("q", &[], &[], None, None, &(&proof).into()).unwrap();
        assert!(v.valid);
        let explicit = svc.verify("q", &[], &[], Some("[]"), None, &(&proof).into()).unwrap();
        assert!(!explicit.valid);
    }

    #[test]
    fn default_guidelines_errors_when_unconfigured() {
        let err = ProofService::in_memory().default_guidelines().unwrap_err();
        assert_eq!(err.kind(), "guideline_unavailable");
    }

    #[test]
    fn verify_session_reports_mismatches() {
        let svc = ProofService::in_memory();
        let mut session = SessionInput {
            prompt: "hello".into(),
            guidelines_json: Some("[]".into()),
            ..SessionInput::default()
        };
        let proof = svc.compute_session(&session).unwrap();
        session.results.push(json!({"extra": true}));
        let v = svc.verify_session(&session, &(&proof).into()).unwrap();
        assert!(!v.valid);
        assert_eq!(v.mismatched, vec!["results_hash".to_string()]);
    }

    #[tokio::test]
    async fn unconfigured_anchor_is_configuration_error() {
        let err = ProofService::in_memory().anchor("abc").await.unwrap_err();
        assert_eq!(err.kind(), "configuration_error");
        let err = ProofService::in_memory().status("abc").await.unwrap_err();
        assert_eq!(err.kind(), "configuration_error");
    }

    #[tokio::test]
    async fn empty_hash_is_invalid_request() {
        let err = configured().anchor("").await.unwrap_err();
        assert_eq!(err.kind(), "invalid_request");
    }

    #[tokio::test]
    async fn anchor_status_history_flow() {
        let svc = configured();
        let proof = svc.compute("hello", &[], &[], Some("[]"), None).unwrap();
        let hash = proof.combined_hash.to_hex();

        let receipt = svc.anchor(&hash).await.unwrap();
        assert!(receipt.explorer_url.unwrap().starts_with("https://scan.example/tx/0x"));
        let status = svc.status(&hash).await.unwrap();
        assert!(status.anchored);

        let events = svc.history(Some(&hash), 10).unwrap();
        assert_eq!(events.len(), 2);
        assert_eq!(events[0].action, AnchorAction::Status);
        assert_eq!(events[1].action, AnchorAction::Anchor);
        assert!(svc.history(Some("unknown"), 10).unwrap().is_empty());
        assert!(svc.storage_degraded().is_none());
    }

    #[tokio::test]
    async fn anchor_a_then_b_lists_b_first() {
        let svc = configured();
        svc.anchor("A").await.unwrap();
        svc.anchor("B").await.unwrap();
        let events = svc.history(None, 10).unwrap();
        assert_eq!(events[0].hash, "B");
        assert_eq!(events[1].hash, "A");
    }

    #[tokio::test]
    async fn history_limit_is_clamped() {
        let svc = configured();
        for i in 0..3 {
            svc.anchor(&format!("h{i}")).await.unwrap();
        }
        assert_eq!(svc.history(None, 5000).unwrap().len(), 3);
        assert!(svc.history(None, -1).unwrap().is_empty());
        assert_eq!(svc.history(None, 2).unwrap().len(), 2);
    }
}
