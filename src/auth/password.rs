//! Password digests via bcrypt.

use super::AuthError;

/// Hash a secret with bcrypt at the given cost.
pub fn hash_password(secret: &str, cost: u32) -> Result<String, AuthError> {
    bcrypt::hash(secret, cost).map_err(|e| AuthError::Internal(format!("bcrypt hash: {e}")))
}

/// Verify a secret against a stored bcrypt digest.
pub fn verify_password(secret: &str, digest: &str) -> Result<bool, AuthError> {
    bcrypt::verify(secret, digest).map_err(|e| AuthError::Internal(format!("bcrypt verify: {e}")))
}

/// [`hash_password`] on the blocking pool
pub async fn hash_password_blocking(secret: String, cost: u32) -> Result<String, AuthError> {
    tokio::task::spawn_blocking(move || hash_password(&secret, cost))
        .await
        .map_err(|e| AuthError::Internal(format!("hash task failed: {e}")))?
}

/// [`verify_password`] on the blocking pool
pub async fn verify_password_blocking(secret: String, digest: String) -> Result<bool, AuthError> {
    tokio::task::spawn_blocking(move || verify_password(&secret, &digest))
        .await
        .map_err(|e| AuthError::Internal(format!("verify task failed: {e}")))?
}
