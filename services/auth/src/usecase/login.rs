use tracing::info;

use crate::domain::repository::IdentityService;
use crate::domain::types::{Session, normalize_email};
use crate::error::AuthServiceError;

pub struct LoginInput {
    pub email: String,
    pub password: String,
}

pub struct LoginUseCase<I: IdentityService> {
    pub identities: I,
}

impl<I: IdentityService> LoginUseCase<I> {
    /// Single password sign-in attempt; no retry.
    pub async fn execute(&self, input: LoginInput) -> Result<Session, AuthServiceError> {
        let email = normalize_email(&input.email);
        if email.is_empty() || input.password.is_empty() {
            return Err(AuthServiceError::InvalidCredentials);
        }
        let session = self.identities.authenticate(&email, &input.password).await?;
        info!(user_id = %session.user.id, "user signed in");
        Ok(session)
    }
}
