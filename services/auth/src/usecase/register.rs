use anyhow::Context as _;
use serde::Serialize;
use serde_json::Value;
use tracing::{error, info, warn};

use comuhub_domain::business::{BUSINESSES_TABLE, Business};
use comuhub_domain::profile::{PROFILES_TABLE, Profile};
use comuhub_domain::role::Role;

use crate::domain::repository::{IdentityService, RecordStore};
use crate::domain::types::{RowFilter, Session, UserIdentity, normalize_email};
use crate::error::AuthServiceError;

// ── Input ────────────────────────────────────────────────────────────────────

pub struct RegisterInput {
    pub email: String,
    pub password: String,
    pub name: String,
    /// Raw role string; validated into [`Role`].
    pub role: String,
    pub phone: Option<String>,
    pub avatar_url: Option<String>,
    pub business: BusinessFields,
}

/// Business fields as submitted. Only read when the role is `negocio`.
#[derive(Debug, Default, Clone)]
pub struct BusinessFields {
    pub name: Option<String>,
    pub nit: Option<String>,
    pub address: Option<String>,
    pub description: Option<String>,
    pub logo_url: Option<String>,
    pub type_id: Option<i64>,
}

#[derive(Debug)]
pub struct RegisterOutput {
    pub session: Session,
    pub role: Role,
    /// `true` when an existing orphan identity was completed instead of a new one created.
    pub repaired: bool,
}

/// Input after validation; everything needed to build the rows.
struct Registration {
    email: String,
    password: String,
    name: String,
    role: Role,
    phone: Option<String>,
    avatar_url: Option<String>,
    business: Option<BusinessDraft>,
}

struct BusinessDraft {
    name: String,
    nit: String,
    address: String,
    description: Option<String>,
    logo_url: Option<String>,
    type_id: Option<i64>,
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_owned())
        .filter(|v| !v.is_empty())
}

fn required(value: Option<String>, field: &str) -> Result<String, AuthServiceError> {
    non_blank(value)
        .ok_or_else(|| AuthServiceError::InvalidRequest(format!("{field} is required")))
}

impl Registration {
    fn validate(input: RegisterInput) -> Result<Self, AuthServiceError> {
        let email = normalize_email(&input.email);
        if email.is_empty() || !email.contains('@') {
            return Err(AuthServiceError::InvalidRequest(
                "email is not valid".to_owned(),
            ));
        }
        if input.password.is_empty() {
            return Err(AuthServiceError::InvalidRequest(
                "password is required".to_owned(),
            ));
        }
        let name = required(Some(input.name), "name")?;
        let role: Role = input
            .role
            .trim()
            .parse()
            .map_err(|e: comuhub_domain::role::UnknownRole| {
                AuthServiceError::InvalidRequest(e.to_string())
            })?;

        let business = if role.requires_business() {
            let fields = input.business;
            Some(BusinessDraft {
                name: required(fields.name, "business_name")?,
                nit: required(fields.nit, "nit")?,
                address: required(fields.address, "address")?,
                description: non_blank(fields.description),
                logo_url: non_blank(fields.logo_url),
                type_id: fields.type_id,
            })
        } else {
            None
        };

        Ok(Self {
            email,
            password: input.password,
            name,
            role,
            phone: non_blank(input.phone),
            avatar_url: non_blank(input.avatar_url),
            business,
        })
    }

    fn profile(&self, user_id: &str) -> Profile {
        Profile {
            id: user_id.to_owned(),
            role: self.role,
            name: self.name.clone(),
            email: self.email.clone(),
            phone: self.phone.clone(),
            avatar_url: self.avatar_url.clone(),
        }
    }

    fn business(&self, user_id: &str) -> Option<Business> {
        self.business.as_ref().map(|draft| Business {
            user_id: user_id.to_owned(),
            name: draft.name.clone(),
            nit: draft.nit.clone(),
            address: draft.address.clone(),
            description: draft.description.clone(),
            logo_url: draft.logo_url.clone(),
            type_id: draft.type_id,
        })
    }
}

// ── Progress & rollback ──────────────────────────────────────────────────────

/// Furthest step that has committed for the identity being provisioned.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Reached {
    Identity,
    Profile,
    Business,
}

#[derive(Debug)]
struct Progress {
    user_id: String,
    /// `false` for a pre-existing identity, which rollback must leave alone.
    owns_identity: bool,
    reached: Reached,
}

/// A compensating delete that did not go through. Logged, never returned to callers.
#[derive(Debug, thiserror::Error)]
#[error("rollback of {target} for user {user_id} failed: {source}")]
pub struct RollbackFailure {
    pub user_id: String,
    pub target: &'static str,
    pub source: AuthServiceError,
}

fn to_row<T: Serialize>(record: &T, what: &str) -> Result<Value, AuthServiceError> {
    Ok(serde_json::to_value(record).with_context(|| format!("serialize {what} row"))?)
}

/// Collapse errors that would otherwise surface as 401/500 into the 400
/// registration failure the endpoint promises.
fn registration_failure(err: AuthServiceError) -> AuthServiceError {
    match err {
        AuthServiceError::Internal(e) => AuthServiceError::Registration(format!("{e:#}")),
        AuthServiceError::InvalidCredentials => {
            AuthServiceError::Registration("new credentials were rejected".to_owned())
        }
        other => other,
    }
}

// ── RegisterUseCase ──────────────────────────────────────────────────────────

pub struct RegisterUseCase<I, R>
where
    I: IdentityService,
    R: RecordStore,
{
    pub identities: I,
    pub records: R,
}

impl<I, R> RegisterUseCase<I, R>
where
    I: IdentityService,
    R: RecordStore,
{
    pub async fn execute(&self, input: RegisterInput) -> Result<RegisterOutput, AuthServiceError> {
        let registration = Registration::validate(input)?;
        self.provision(&registration)
            .await
            .map_err(registration_failure)
    }

    async fn provision(&self, reg: &Registration) -> Result<RegisterOutput, AuthServiceError> {
        // 1. Duplicate check, or adopt an orphan identity the caller can prove they own.
        let existing = self.identities.find_by_email(&reg.email).await?;
        let (mut progress, adopted_session) = match existing {
            Some(existing) => {
                let session = self.claim_orphan(&existing, reg).await?;
                let progress = Progress {
                    user_id: existing.id,
                    owns_identity: false,
                    reached: Reached::Identity,
                };
                (progress, Some(session))
            }
            None => {
                // 2. Create the identity, email already confirmed.
                let identity = self
                    .identities
                    .create_identity(&reg.email, &reg.password, true)
                    .await?;
                let progress = Progress {
                    user_id: identity.id,
                    owns_identity: true,
                    reached: Reached::Identity,
                };
                (progress, None)
            }
        };

        match self.complete(reg, &mut progress, adopted_session).await {
            Ok(session) => {
                info!(
                    user_id = %progress.user_id,
                    role = %reg.role,
                    repaired = !progress.owns_identity,
                    "account provisioned"
                );
                Ok(RegisterOutput {
                    session,
                    role: reg.role,
                    repaired: !progress.owns_identity,
                })
            }
            Err(err) => {
                warn!(
                    user_id = %progress.user_id,
                    reached = ?progress.reached,
                    error = %err,
                    "provisioning failed, rolling back"
                );
                for failure in self.rollback(&progress).await {
                    error!(
                        user_id = %failure.user_id,
                        step = failure.target,
                        error = %failure.source,
                        "rollback step failed"
                    );
                }
                Err(err)
            }
        }
    }

    /// Existing identity: fail if it already has a profile, otherwise verify the
    /// password so one account cannot be attached to someone else's identity.
    async fn claim_orphan(
        &self,
        existing: &UserIdentity,
        reg: &Registration,
    ) -> Result<Session, AuthServiceError> {
        let profiles = self
            .records
            .select(PROFILES_TABLE, &RowFilter::eq("id", existing.id.as_str()))
            .await?;
        if !profiles.is_empty() {
            return Err(AuthServiceError::UserAlreadyExists);
        }
        match self.identities.authenticate(&reg.email, &reg.password).await {
            Ok(session) => Ok(session),
            Err(AuthServiceError::InvalidCredentials) => Err(AuthServiceError::UserAlreadyExists),
            Err(e) => Err(e),
        }
    }

    /// 3. Profile row, 4. business row for `negocio`, 5. sign-in.
    async fn complete(
        &self,
        reg: &Registration,
        progress: &mut Progress,
        adopted_session: Option<Session>,
    ) -> Result<Session, AuthServiceError> {
        let profile = reg.profile(&progress.user_id);
        if let Err(err) = self
            .records
            .insert(PROFILES_TABLE, &to_row(&profile, PROFILES_TABLE)?)
            .await
        {
            return Err(self.profile_insert_failed(progress, err).await);
        }
        progress.reached = Reached::Profile;

        if let Some(business) = reg.business(&progress.user_id) {
            self.records
                .insert(BUSINESSES_TABLE, &to_row(&business, BUSINESSES_TABLE)?)
                .await?;
            progress.reached = Reached::Business;
        }

        match adopted_session {
            Some(session) => Ok(session),
            None => self.identities.authenticate(&reg.email, &reg.password).await,
        }
    }

    /// A concurrent registration for the same email may have completed this
    /// identity first. Its profile now exists, so the identity is no longer
    /// ours to delete. When the check itself fails the identity is kept; an
    /// orphan can be repaired, a profile without an identity cannot.
    async fn profile_insert_failed(
        &self,
        progress: &mut Progress,
        err: AuthServiceError,
    ) -> AuthServiceError {
        let filter = RowFilter::eq("id", progress.user_id.as_str());
        match self.records.select(PROFILES_TABLE, &filter).await {
            Ok(rows) if rows.is_empty() => err,
            Ok(_) => {
                progress.owns_identity = false;
                AuthServiceError::UserAlreadyExists
            }
            Err(check) => {
                warn!(
                    user_id = %progress.user_id,
                    error = %check,
                    "could not check for a concurrent profile, keeping identity"
                );
                progress.owns_identity = false;
                err
            }
        }
    }

    /// Undo committed steps in reverse order. Each delete is tried once; a
    /// failure does not stop the remaining ones.
    async fn rollback(&self, progress: &Progress) -> Vec<RollbackFailure> {
        let user_id = progress.user_id.as_str();
        let mut failures = Vec::new();

        if progress.reached >= Reached::Business {
            if let Err(source) = self
                .records
                .delete(BUSINESSES_TABLE, &RowFilter::eq("user_id", user_id))
                .await
            {
                failures.push(RollbackFailure {
                    user_id: user_id.to_owned(),
                    target: BUSINESSES_TABLE,
                    source,
                });
            }
        }

        if progress.reached >= Reached::Profile {
            if let Err(source) = self
                .records
                .delete(PROFILES_TABLE, &RowFilter::eq("id", user_id))
                .await
            {
                failures.push(RollbackFailure {
                    user_id: user_id.to_owned(),
                    target: PROFILES_TABLE,
                    source,
                });
            }
        }

        if progress.owns_identity {
            if let Err(source) = self.identities.delete_identity(user_id).await {
                failures.push(RollbackFailure {
                    user_id: user_id.to_owned(),
                    target: "identity",
                    source,
                });
            }
        }

        failures
    }
}
