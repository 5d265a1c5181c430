use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::api::response::{ApiError, AppJson, JSend};
use crate::auth::{self, Registration};
use crate::storage::models::{Account, Role};
use crate::AppState;

// ============================================================================
// Types
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub email: String,
    #[serde(alias = "secret")]
    pub password: String,
    #[serde(default)]
    pub role: Option<Role>,
    #[serde(alias = "identifier")]
    pub username: String,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    #[serde(alias = "secret")]
    pub password: String,
    /// Username or email address
    #[serde(alias = "identifier")]
    pub username: String,
}

#[derive(Debug, Serialize)]
pub struct AccountResponse {
    pub email: String,
    pub role: Role,
    pub username: String,
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub expires_at: String,
    pub token: String,
    pub user: AccountResponse,
}

fn account_to_response(account: &Account) -> AccountResponse {
    AccountResponse {
        email: account.email.clone(),
        role: account.role,
        username: account.username.clone(),
    }
}

// ============================================================================
// Handlers
// ============================================================================

pub async fn register(
    State(state): State<Arc<AppState>>,
    AppJson(req): AppJson<RegisterRequest>,
) -> Result<(StatusCode, Json<JSend<AccountResponse>>), ApiError> {
    let account = auth::register(
        &state,
        Registration {
            email: req.email,
            password: req.password,
            role: req.role,
            username: req.username,
        },
    )
    .await?;

    Ok(JSend::created(account_to_response(&account)))
}

pub async fn login(
    State(state): State<Arc<AppState>>,
    AppJson(req): AppJson<LoginRequest>,
) -> Result<Json<JSend<LoginResponse>>, ApiError> {
    let (issued, account) = auth::login(&state, &req.username, &req.password).await?;

    Ok(JSend::success(LoginResponse {
        expires_at: issued.expires_at.to_rfc3339(),
        token: issued.token,
        user: account_to_response(&account),
    }))
}
