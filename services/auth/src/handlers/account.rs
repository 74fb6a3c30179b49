use axum::{Json, extract::State, extract::rejection::JsonRejection};
use serde::{Deserialize, Serialize};

use comuhub_domain::role::Role;

use crate::domain::types::Session;
use crate::error::AuthServiceError;
use crate::state::AppState;
use crate::usecase::login::{LoginInput, LoginUseCase};
use crate::usecase::register::{BusinessFields, RegisterInput, RegisterUseCase};

// ── POST /auth/register ──────────────────────────────────────────────────────

#[derive(Deserialize)]
pub struct RegisterRequest {
    pub email: String,
    pub password: String,
    pub name: String,
    /// `"cliente"` or `"negocio"`.
    pub role: String,
    pub phone: Option<String>,
    pub avatar_url: Option<String>,
    // Business fields, read only for `negocio`.
    pub business_name: Option<String>,
    pub nit: Option<String>,
    pub address: Option<String>,
    pub description: Option<String>,
    pub logo_url: Option<String>,
    pub type_id: Option<i64>,
}

#[derive(Serialize)]
pub struct RegisteredUser {
    pub id: String,
    pub email: String,
    pub role: Role,
}

#[derive(Serialize)]
pub struct RegisterResponse {
    pub access_token: String,
    pub refresh_token: String,
    pub user: RegisteredUser,
}

pub async fn register(
    State(state): State<AppState>,
    payload: Result<Json<RegisterRequest>, JsonRejection>,
) -> Result<Json<RegisterResponse>, AuthServiceError> {
    let Json(body) = payload?;
    let usecase = RegisterUseCase {
        identities: state.identity_service(),
        records: state.record_store(),
    };
    let out = usecase
        .execute(RegisterInput {
            email: body.email,
            password: body.password,
            name: body.name,
            role: body.role,
            phone: body.phone,
            avatar_url: body.avatar_url,
            business: BusinessFields {
                name: body.business_name,
                nit: body.nit,
                address: body.address,
                description: body.description,
                logo_url: body.logo_url,
                type_id: body.type_id,
            },
        })
        .await?;
    let Session {
        access_token,
        refresh_token,
        user,
    } = out.session;
    Ok(Json(RegisterResponse {
        access_token,
        refresh_token,
        user: RegisteredUser {
            id: user.id,
            email: user.email,
            role: out.role,
        },
    }))
}

// ── POST /auth/login ─────────────────────────────────────────────────────────

#[derive(Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Serialize)]
pub struct SessionUserResponse {
    pub id: String,
    pub email: String,
}

#[derive(Serialize)]
pub struct LoginResponse {
    pub access_token: String,
    pub refresh_token: String,
    pub user: SessionUserResponse,
}

pub async fn login(
    State(state): State<AppState>,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> Result<Json<LoginResponse>, AuthServiceError> {
    let Json(body) = payload?;
    let usecase = LoginUseCase {
        identities: state.identity_service(),
    };
    let session = usecase
        .execute(LoginInput {
            email: body.email,
            password: body.password,
        })
        .await?;
    Ok(Json(LoginResponse {
        access_token: session.access_token,
        refresh_token: session.refresh_token,
        user: SessionUserResponse {
            id: session.user.id,
            email: session.user.email,
        },
    }))
}
