use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

/// Auth service error variants.
///
/// Every provisioning failure is a 400; only a rejected login is a 401.
#[derive(Debug, thiserror::Error)]
pub enum AuthServiceError {
    #[error("invalid request: {0}")]
    InvalidRequest(String),
    #[error("user already exists")]
    UserAlreadyExists,
    #[error("could not create user: {0}")]
    IdentityCreation(String),
    #[error("could not save records: {0}")]
    RecordStore(String),
    #[error("registration failed: {0}")]
    Registration(String),
    #[error("invalid credentials")]
    InvalidCredentials,
    #[error("internal error")]
    Internal(#[from] anyhow::Error),
}

impl AuthServiceError {
    pub fn status(&self) -> StatusCode {
        match self {
            Self::InvalidRequest(_)
            | Self::UserAlreadyExists
            | Self::IdentityCreation(_)
            | Self::RecordStore(_)
            | Self::Registration(_) => StatusCode::BAD_REQUEST,
            Self::InvalidCredentials => StatusCode::UNAUTHORIZED,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<JsonRejection> for AuthServiceError {
    fn from(rejection: JsonRejection) -> Self {
        Self::InvalidRequest(rejection.body_text())
    }
}

impl IntoResponse for AuthServiceError {
    fn into_response(self) -> Response {
        let status = self.status();
        // 4xx are expected client errors and already visible in the trace layer.
        if let Self::Internal(ref e) = self {
            tracing::error!(error = %format!("{e:#}"), kind = "INTERNAL", "internal error");
        }
        let body = serde_json::json!({ "detail": self.to_string() });
        (status, axum::Json(body)).into_response()
    }
}
