use axum::Json;
use axum::http::StatusCode;
use serde_json::{Value, json};

/// Handler for `GET /healthz`: liveness check. The process is up.
pub async fn healthz() -> StatusCode {
    StatusCode::OK
}

/// Build a readiness response. Services call this from their own `/readyz`
/// handler after probing their dependencies.
pub fn readiness(ready: bool) -> (StatusCode, Json<Value>) {
    if ready {
        (StatusCode::OK, Json(json!({ "status": "ready" })))
    } else {
        (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(json!({ "status": "unavailable" })),
        )
    }
}
