//! Registration and login.
//!
//! Registration checks for an existing username or email, digests the secret
//! and inserts the account; the store's insert-if-absent is the final word
//! when two registrations race. Login never tells the caller whether the
//! account was missing or the secret was wrong.

pub mod password;

use chrono::Utc;
use thiserror::Error;

use crate::storage::models::{Account, Role};
use crate::storage::DatabaseError;
use crate::tokens::{generate_secret, IssuedToken, TokenError};
use crate::AppState;

use password::{hash_password_blocking, verify_password_blocking};

/// Minimum accepted secret length at registration
pub const MIN_SECRET_LEN: usize = 6;

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("An account with that username or email already exists")]
    AlreadyExists,

    #[error("Internal error: {0}")]
    Internal(String),

    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Store error: {0}")]
    Store(#[from] DatabaseError),

    #[error("Token error: {0}")]
    Token(#[from] TokenError),

    #[error("Validation error: {0}")]
    Validation(String),
}

/// A registration request
#[derive(Debug, Clone)]
pub struct Registration {
    pub email: String,
    pub password: String,
    /// Requested role; `None` registers a plain user
    pub role: Option<Role>,
    pub username: String,
}

impl Registration {
    fn validate(&self) -> Result<(), AuthError> {
        if self.username.trim().is_empty() {
            return Err(AuthError::Validation("username is required".to_string()));
        }
        if self.username.trim() != self.username {
            return Err(AuthError::Validation(
                "username must not have leading or trailing whitespace".to_string(),
            ));
        }
        if self.email.trim().is_empty() || !self.email.contains('@') {
            return Err(AuthError::Validation(
                "email must be a valid address".to_string(),
            ));
        }
        if self.password.chars().count() < MIN_SECRET_LEN {
            return Err(AuthError::Validation(format!(
                "password must be at least {MIN_SECRET_LEN} characters"
            )));
        }
        Ok(())
    }
}

/// Register a new account.
pub async fn register(state: &AppState, registration: Registration) -> Result<Account, AuthError> {
    registration.validate()?;

    let role = registration.role.unwrap_or_default();
    if role == Role::Admin {
        if !state.config.auth.allow_self_assigned_role {
            return Err(AuthError::Validation(
                "role cannot be assigned at registration".to_string(),
            ));
        }
        tracing::warn!(username = %registration.username, "Registration requested the ADMIN role");
    }

    let timeout = state.config.store_timeout();
    let username = registration.username.clone();
    let email = registration.email.trim().to_string();

    let exists = {
        let (username, email) = (username.clone(), email.clone());
        state
            .db
            .run(timeout, move |db| db.account_exists(&username, &email))
            .await?
    };
    if exists {
        tracing::debug!(username = %username, "Registration rejected: account exists");
        return Err(AuthError::AlreadyExists);
    }

    let password_digest =
        hash_password_blocking(registration.password, state.config.auth.bcrypt_cost).await?;

    let account = Account {
        created_at: Utc::now(),
        email,
        password_digest,
        role,
        username,
    };

    let inserted = {
        let account = account.clone();
        state
            .db
            .run(timeout, move |db| db.insert_account_if_absent(&account))
            .await?
    };
    if !inserted {
        tracing::debug!(username = %account.username, "Registration lost a race: account exists");
        return Err(AuthError::AlreadyExists);
    }

    tracing::info!(username = %account.username, role = %account.role, "Registered account");
    Ok(account)
}

/// Digest of a random secret at the configured cost, computed once per state.
pub async fn decoy_digest(state: &AppState) -> Result<&str, AuthError> {
    let cost = state.config.auth.bcrypt_cost;
    let digest = state
        .decoy_digest
        .get_or_try_init(|| async move { hash_password_blocking(generate_secret(), cost).await })
        .await?;
    Ok(digest.as_str())
}

/// Verify credentials and issue a session token.
///
/// `identifier` may be the username or the email address.
pub async fn login(
    state: &AppState,
    identifier: &str,
    password: &str,
) -> Result<(IssuedToken, Account), AuthError> {
    let lookup = identifier.to_string();
    let account = state
        .db
        .run(state.config.store_timeout(), move |db| db.find_account(&lookup))
        .await?;

    let account = match account {
        Some(account) => account,
        None => {
            // Spend the same bcrypt work a wrong secret would
            match decoy_digest(state).await {
                Ok(digest) => {
                    let _ = verify_password_blocking(password.to_string(), digest.to_string()).await;
                }
                Err(e) => tracing::error!(error = %e, "Decoy digest unavailable"),
            }
            tracing::debug!("Login failed");
            return Err(AuthError::InvalidCredentials);
        }
    };

    let verified =
        match verify_password_blocking(password.to_string(), account.password_digest.clone()).await
        {
            Ok(verified) => verified,
            Err(e) => {
                tracing::error!(error = %e, username = %account.username, "Stored digest could not be checked");
                false
            }
        };
    if !verified {
        tracing::debug!("Login failed");
        return Err(AuthError::InvalidCredentials);
    }

    let issued = state.tokens.issue(&account.username, account.role)?;
    tracing::info!(username = %account.username, "Login succeeded");
    Ok((issued, account))
}
