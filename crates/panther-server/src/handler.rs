use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::{Query, State};
use axum::response::Json;
use panther_sdk::{
    AnchorEvent, AnchorReceipt, ClaimedProof, Proof, ProviderConfig, SessionInput, StatusReceipt,
    Verification,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{ServerError, ServerResult};
use crate::state::AppState;

/// Body of `POST /proof/verify`: the session fields plus the proof being
/// checked.
///
/// Not flattened from [`SessionInput`]: flatten buffering loses exact
/// number text.
#[derive(Debug, Deserialize)]
pub struct VerifyRequest {
    pub prompt: String,
    #[serde(default)]
    pub providers: Vec<ProviderConfig>,
    #[serde(default)]
    pub results: Vec<Value>,
    #[serde(default)]
    pub guidelines_json: Option<String>,
    #[serde(default)]
    pub salt: Option<String>,
    #[serde(default)]
    pub proof: ClaimedProof,
}

impl VerifyRequest {
    fn into_parts(self) -> (SessionInput, ClaimedProof) {
        let session = SessionInput {
            prompt: self.prompt,
            providers: self.providers,
            results: self.results,
            guidelines_json: self.guidelines_json,
            salt: self.salt,
        };
        (session, self.proof)
    }
}

/// Body of `POST /proof/anchor`. `hash` wins over `combined_hash`.
#[derive(Debug, Default, Deserialize)]
pub struct AnchorRequest {
    #[serde(default)]
    pub hash: Option<String>,
    #[serde(default)]
    pub combined_hash: Option<String>,
}

impl AnchorRequest {
    fn target(self) -> String {
        [self.hash, self.combined_hash]
            .into_iter()
            .flatten()
            .find(|h| !h.trim().is_empty())
            .unwrap_or_default()
    }
}

#[derive(Debug, Deserialize)]
pub struct StatusParams {
    #[serde(default)]
    pub hash: String,
}

/// Query of `GET /proof/history`. `limit` stays text so that any integer,
/// however large, can be clamped.
#[derive(Debug, Deserialize)]
pub struct HistoryParams {
    pub hash: Option<String>,
    pub limit: Option<String>,
}

impl HistoryParams {
    fn limit(&self) -> ServerResult<i64> {
        let raw = match self.limit.as_deref().map(str::trim) {
            None | Some("") => return Ok(panther_sdk::DEFAULT_HISTORY_LIMIT as i64),
            Some(raw) => raw,
        };
        if let Ok(limit) = raw.parse::<i64>() {
            return Ok(limit);
        }
        let (negative, digits) = match raw.strip_prefix('-') {
            Some(rest) => (true, rest),
            None => (false, raw.strip_prefix('+').unwrap_or(raw)),
        };
        if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
            return Err(ServerError::BadRequest(format!(
                "invalid 'limit': expected an integer, got {raw:?}"
            )));
        }
        Ok(if negative { i64::MIN } else { i64::MAX })
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub history_degraded: bool,
}

fn body<T>(payload: Result<Json<T>, JsonRejection>) -> ServerResult<T> {
    payload
        .map(|Json(v)| v)
        .map_err(|e| ServerError::BadRequest(e.body_text()))
}

fn query<T>(params: Result<Query<T>, QueryRejection>) -> ServerResult<T> {
    params
        .map(|Query(v)| v)
        .map_err(|e| ServerError::BadRequest(e.body_text()))
}

/// `GET /health`
pub async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".into(),
        version: env!("CARGO_PKG_VERSION").into(),
        history_degraded: state.service.storage_degraded().is_some(),
    })
}

/// `GET /guidelines/default`
pub async fn default_guidelines(State(state): State<AppState>) -> ServerResult<Json<Value>> {
    Ok(Json(state.service.default_guidelines()?))
}

/// `POST /proof/compute`
pub async fn compute(
    State(state): State<AppState>,
    payload: Result<Json<SessionInput>, JsonRejection>,
) -> ServerResult<Json<Proof>> {
    let session = body(payload)?;
    Ok(Json(state.service.compute_session(&session)?))
}

/// `POST /proof/anchor`
pub async fn anchor(
    State(state): State<AppState>,
    payload: Result<Json<AnchorRequest>, JsonRejection>,
) -> ServerResult<Json<AnchorReceipt>> {
    let hash = body(payload)?.target();
    Ok(Json(state.service.anchor(&hash).await?))
}

/// `GET /proof/status?hash=`
pub async fn status(
    State(state): State<AppState>,
    params: Result<Query<StatusParams>, QueryRejection>,
) -> ServerResult<Json<StatusReceipt>> {
    let params = query(params)?;
    Ok(Json(state.service.status(&params.hash).await?))
}

/// `GET /proof/history?hash=&limit=`
pub async fn history(
    State(state): State<AppState>,
    params: Result<Query<HistoryParams>, QueryRejection>,
) -> ServerResult<Json<Vec<AnchorEvent>>> {
    let params = query(params)?;
    let limit = params.limit()?;
    Ok(Json(state.service.history(params.hash.as_deref(), limit)?))
}

/// `POST /proof/verify`
pub async fn verify(
    State(state): State<AppState>,
    payload: Result<Json<VerifyRequest>, JsonRejection>,
) -> ServerResult<Json<Verification>> {
    let (session, proof) = body(payload)?.into_parts();
    Ok(Json(state.service.verify_session(&session, &proof)?))
}
