mod auth;
mod health;
mod sweets;

use crate::api::response::ApiError;
use crate::auth::AuthError;
use crate::ledger::LedgerError;
use crate::storage::DatabaseError;

pub use auth::{login, register};
pub use health::health;
pub use sweets::{
    add_sweet, delete_sweet, get_sweet, list_sweets, purchase_sweet, restock_sweet,
    search_sweets, update_sweet,
};

/// Map a store failure to an ApiError; timeouts are worth retrying
fn store_error(e: DatabaseError) -> ApiError {
    if e.is_retryable() {
        tracing::warn!(error = %e, "Store busy");
        ApiError::unavailable("Store is busy, retry shortly")
    } else {
        tracing::error!(error = %e, "Store failure");
        ApiError::internal("Internal storage error")
    }
}

impl From<AuthError> for ApiError {
    fn from(e: AuthError) -> Self {
        match e {
            AuthError::AlreadyExists => ApiError::conflict(e.to_string()),
            AuthError::InvalidCredentials => ApiError::unauthorized(e.to_string()),
            AuthError::Validation(msg) => ApiError::bad_request(msg),
            AuthError::Store(e) => store_error(e),
            AuthError::Internal(_) | AuthError::Token(_) => {
                tracing::error!(error = %e, "Authentication failure");
                ApiError::internal("Internal error")
            }
        }
    }
}

impl From<LedgerError> for ApiError {
    fn from(e: LedgerError) -> Self {
        match e {
            LedgerError::NotFound(_) => ApiError::not_found(e.to_string()),
            LedgerError::OutOfStock(_) => ApiError::conflict(e.to_string()),
            LedgerError::Validation(msg) => ApiError::bad_request(msg),
            LedgerError::Store(e) => store_error(e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode;
    use std::time::Duration;

    #[test]
    fn test_ledger_error_statuses() {
        assert_eq!(
            ApiError::from(LedgerError::NotFound(3)).status(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            ApiError::from(LedgerError::OutOfStock(3)).status(),
            StatusCode::CONFLICT
        );
        assert_eq!(
            ApiError::from(LedgerError::Validation("bad".to_string())).status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ApiError::from(LedgerError::Store(DatabaseError::Timeout(Duration::from_millis(5))))
                .status(),
            StatusCode::SERVICE_UNAVAILABLE
        );
    }

    #[test]
    fn test_auth_error_statuses() {
        assert_eq!(
            ApiError::from(AuthError::AlreadyExists).status(),
            StatusCode::CONFLICT
        );
        assert_eq!(
            ApiError::from(AuthError::InvalidCredentials).status(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            ApiError::from(AuthError::Internal("boom".to_string())).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
