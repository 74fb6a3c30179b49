use axum::{Json, extract::State, http::StatusCode};
use serde_json::Value;

use comuhub_core::health::readiness;

use crate::state::AppState;

/// `GET /readyz`: ready when the identity service answers its health probe.
pub async fn readyz(State(state): State<AppState>) -> (StatusCode, Json<Value>) {
    readiness(state.identity_service().is_healthy().await)
}
