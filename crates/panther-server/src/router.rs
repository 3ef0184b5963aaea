use axum::routing::{get, post};
use axum::{middleware, Router};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::auth::require_api_key;
use crate::handler;
use crate::state::AppState;

/// Build the axum router with all proof endpoints.
///
/// `/health` is always open; everything else sits behind the API-key guard.
pub fn build_router(state: AppState) -> Router {
    let guarded = Router::new()
        .route("/proof/compute", post(handler::compute))
        .route("/proof/anchor", post(handler::anchor))
        .route("/proof/status", get(handler::status))
        .route("/proof/history", get(handler::history))
        .route("/proof/verify", post(handler::verify))
        .route("/guidelines/default", get(handler::default_guidelines))
        .route_layer(middleware::from_fn_with_state(state.clone(), require_api_key));

    Router::new()
        .route("/health", get(handler::health))
        .merge(guarded)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
