use anyhow::{Context as _, anyhow};
use reqwest::{Method, StatusCode};
use serde::Deserialize;
use serde_json::json;

use crate::domain::repository::IdentityService;
use crate::domain::types::{Session, UserIdentity, normalize_email};
use crate::error::AuthServiceError;
use crate::infra::supabase::{ApiFailure, SupabaseClient};

/// Page size for the admin user listing used by [`IdentityService::find_by_email`].
pub const LIST_USERS_PER_PAGE: usize = 200;

/// Upper bound on pages read by one lookup.
pub const MAX_LIST_PAGES: usize = 1_000;

/// Supabase GoTrue implementation of [`IdentityService`].
#[derive(Clone)]
pub struct SupabaseIdentityService {
    /// Service-role client: admin create/list/delete.
    pub admin: SupabaseClient,
    /// Public-key client: password sign-in.
    pub public: SupabaseClient,
}

#[derive(Debug, Deserialize)]
struct GoTrueUser {
    id: String,
    #[serde(default)]
    email: Option<String>,
    #[serde(default)]
    email_confirmed_at: Option<String>,
}

impl GoTrueUser {
    fn into_identity(self) -> UserIdentity {
        UserIdentity {
            id: self.id,
            email: self.email.unwrap_or_default(),
            email_confirmed: self.email_confirmed_at.is_some(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct UserPage {
    #[serde(default)]
    users: Vec<GoTrueUser>,
}

impl SupabaseIdentityService {
    /// Probe `GET /auth/v1/health`. Used by the readiness endpoint.
    pub async fn is_healthy(&self) -> bool {
        let Ok(url) = self.public.url("/auth/v1/health") else {
            return false;
        };
        match self.public.request(Method::GET, url).send().await {
            Ok(resp) => resp.status().is_success(),
            Err(e) => {
                tracing::warn!(error = %e, "identity service health probe failed");
                false
            }
        }
    }

    async fn list_page(&self, page: usize) -> Result<Vec<GoTrueUser>, AuthServiceError> {
        let mut url = self.admin.url("/auth/v1/admin/users")?;
        url.query_pairs_mut()
            .append_pair("page", &page.to_string())
            .append_pair("per_page", &LIST_USERS_PER_PAGE.to_string());
        let resp = self
            .admin
            .request(Method::GET, url)
            .send()
            .await
            .context("list identities")?;
        if !resp.status().is_success() {
            let failure = ApiFailure::from_response(resp).await;
            return Err(anyhow!("list identities: {failure}").into());
        }
        let page: UserPage = resp.json().await.context("decode identity page")?;
        Ok(page.users)
    }
}

fn creation_error(failure: &ApiFailure) -> AuthServiceError {
    let duplicate = failure.error_code.as_deref() == Some("email_exists")
        || failure.message.contains("already been registered");
    if duplicate {
        AuthServiceError::IdentityCreation("email already registered".to_owned())
    } else {
        AuthServiceError::IdentityCreation(failure.message.clone())
    }
}

impl IdentityService for SupabaseIdentityService {
    async fn create_identity(
        &self,
        email: &str,
        password: &str,
        pre_confirmed: bool,
    ) -> Result<UserIdentity, AuthServiceError> {
        let url = self.admin.url("/auth/v1/admin/users")?;
        let resp = self
            .admin
            .request(Method::POST, url)
            .json(&json!({
                "email": email,
                "password": password,
                "email_confirm": pre_confirmed,
            }))
            .send()
            .await
            .map_err(|e| AuthServiceError::IdentityCreation(e.to_string()))?;
        if !resp.status().is_success() {
            let failure = ApiFailure::from_response(resp).await;
            return Err(creation_error(&failure));
        }
        let user: GoTrueUser = resp
            .json()
            .await
            .map_err(|e| AuthServiceError::IdentityCreation(format!("unreadable response: {e}")))?;
        Ok(user.into_identity())
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<UserIdentity>, AuthServiceError> {
        let wanted = normalize_email(email);
        let mut previous_ids: Vec<String> = Vec::new();
        for page in 1..=MAX_LIST_PAGES {
            let users = self.list_page(page).await?;
            let count = users.len();
            let ids: Vec<String> = users.iter().map(|u| u.id.clone()).collect();
            if count > 0 && ids == previous_ids {
                // Server ignores `page`; nothing further to read.
                tracing::warn!(page, "identity listing repeated the previous page");
                return Ok(None);
            }
            let hit = users.into_iter().find(|u| {
                u.email
                    .as_deref()
                    .is_some_and(|e| normalize_email(e) == wanted)
            });
            if let Some(user) = hit {
                return Ok(Some(user.into_identity()));
            }
            if count < LIST_USERS_PER_PAGE {
                return Ok(None);
            }
            previous_ids = ids;
        }
        Err(anyhow!("identity listing exceeded {MAX_LIST_PAGES} pages").into())
    }

    async fn delete_identity(&self, id: &str) -> Result<(), AuthServiceError> {
        let url = self.admin.url_with_segment("/auth/v1/admin/users", id)?;
        let resp = self
            .admin
            .request(Method::DELETE, url)
            .send()
            .await
            .context("delete identity")?;
        if resp.status().is_success() || resp.status() == StatusCode::NOT_FOUND {
            return Ok(());
        }
        let failure = ApiFailure::from_response(resp).await;
        Err(anyhow!("delete identity {id}: {failure}").into())
    }

    async fn authenticate(
        &self,
        email: &str,
        password: &str,
    ) -> Result<Session, AuthServiceError> {
        let mut url = self.public.url("/auth/v1/token")?;
        url.query_pairs_mut().append_pair("grant_type", "password");
        let resp = self
            .public
            .request(Method::POST, url)
            .json(&json!({ "email": email, "password": password }))
            .send()
            .await
            .context("password sign-in")?;
        match resp.status() {
            s if s.is_success() => Ok(resp.json().await.context("decode session")?),
            StatusCode::BAD_REQUEST | StatusCode::UNAUTHORIZED => {
                Err(AuthServiceError::InvalidCredentials)
            }
            _ => {
                let failure = ApiFailure::from_response(resp).await;
                Err(anyhow!("password sign-in: {failure}").into())
            }
        }
    }
}
