use axum::{
    Router,
    routing::{get, post},
};
use tower_http::trace::TraceLayer;

use comuhub_core::health::healthz;
use comuhub_core::middleware::{
    make_request_span, propagate_request_id_layer, request_id_layer,
};

use crate::handlers::{
    account::{login, register},
    health::readyz,
};
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        // Health
        .route("/healthz", get(healthz))
        .route("/readyz", get(readyz))
        // Account
        .route("/auth/register", post(register))
        .route("/auth/login", post(login))
        .with_state(state)
        // Last layer added runs first: the id is set before the span is made.
        .layer(propagate_request_id_layer())
        .layer(TraceLayer::new_for_http().make_span_with(make_request_span))
        .layer(request_id_layer())
}
