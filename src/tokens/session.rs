//! Signed, self-contained session tokens.
//!
//! A token is an HS256 JWT carrying the subject, role, issued-at and expiry.
//! Validation needs only the signing key, never a store lookup. The key lives
//! for the lifetime of the process, so a restart invalidates every token
//! issued before it, and instances that do not share a key cannot accept
//! each other's tokens.

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::storage::models::Role;

use super::generator::generate_signing_key;

#[derive(Debug, Error)]
pub enum TokenError {
    #[error("Failed to sign token: {0}")]
    Signing(#[from] jsonwebtoken::errors::Error),
}

/// Claims embedded in every session token
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Expiry (Unix seconds)
    pub exp: i64,
    /// Issued-at (Unix seconds)
    pub iat: i64,
    pub role: Role,
    /// Account username
    pub sub: String,
}

/// The caller identity recovered from a valid token
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    pub role: Role,
    pub subject: String,
}

impl Identity {
    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }
}

/// Result of checking a presented token.
///
/// Malformed, forged and expired tokens all collapse into `Invalid`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TokenCheck {
    Invalid,
    Valid(Identity),
}

#[derive(Debug, Clone)]
pub struct IssuedToken {
    pub expires_at: DateTime<Utc>,
    pub token: String,
}

pub struct TokenService {
    decoding_key: DecodingKey,
    encoding_key: EncodingKey,
    ttl: Duration,
    validation: Validation,
}

impl TokenService {
    /// Create a service with a freshly generated signing key
    pub fn generate(ttl: Duration) -> Self {
        Self::from_secret(&generate_signing_key(), ttl)
    }

    /// Create a service around an existing signing key
    pub fn from_secret(secret: &[u8], ttl: Duration) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        // Expiry is checked against our own clock in `validate_at`
        validation.validate_exp = false;
        validation.leeway = 0;
        validation.set_required_spec_claims(&["exp", "sub"]);

        Self {
            decoding_key: DecodingKey::from_secret(secret),
            encoding_key: EncodingKey::from_secret(secret),
            ttl,
            validation,
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Issue a token for `subject` valid from now for the configured window
    pub fn issue(&self, subject: &str, role: Role) -> Result<IssuedToken, TokenError> {
        self.issue_at(subject, role, Utc::now())
    }

    fn issue_at(
        &self,
        subject: &str,
        role: Role,
        now: DateTime<Utc>,
    ) -> Result<IssuedToken, TokenError> {
        let expires_at = now + self.ttl;
        let claims = Claims {
            exp: expires_at.timestamp(),
            iat: now.timestamp(),
            role,
            sub: subject.to_string(),
        };

        let token = self.sign(&claims)?;
        tracing::debug!(subject = %subject, role = %role, "Issued session token");

        Ok(IssuedToken { expires_at, token })
    }

    fn sign(&self, claims: &Claims) -> Result<String, TokenError> {
        Ok(encode(
            &Header::new(Algorithm::HS256),
            claims,
            &self.encoding_key,
        )?)
    }

    /// Verify signature and expiry, returning the embedded identity
    pub fn validate(&self, token: &str) -> TokenCheck {
        self.validate_at(token, Utc::now())
    }

    fn validate_at(&self, token: &str, now: DateTime<Utc>) -> TokenCheck {
        let claims = match decode::<Claims>(token, &self.decoding_key, &self.validation) {
            Ok(data) => data.claims,
            Err(e) => {
                tracing::debug!(error = %e, "Rejected session token");
                return TokenCheck::Invalid;
            }
        };

        if claims.exp <= claims.iat || claims.exp <= now.timestamp() {
            tracing::debug!(subject = %claims.sub, "Rejected expired session token");
            return TokenCheck::Invalid;
        }

        TokenCheck::Valid(Identity {
            role: claims.role,
            subject: claims.sub,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn service() -> TokenService {
        TokenService::generate(Duration::hours(10))
    }

    #[test]
    fn test_issue_and_validate() {
        let tokens = service();
        let issued = tokens.issue("alice", Role::Admin).unwrap();

        assert_eq!(
            tokens.validate(&issued.token),
            TokenCheck::Valid(Identity {
                role: Role::Admin,
                subject: "alice".to_string(),
            })
        );
    }

    #[test]
    fn test_expiry_is_ten_hours_out() {
        let tokens = service();
        let now = Utc::now();
        let issued = tokens.issue_at("alice", Role::User, now).unwrap();
        assert_eq!(issued.expires_at, now + Duration::hours(10));
    }

    #[test]
    fn test_expired_token_is_invalid() {
        let tokens = service();
        let issued = tokens
            .issue_at("alice", Role::User, Utc::now() - Duration::hours(11))
            .unwrap();

        assert_eq!(tokens.validate(&issued.token), TokenCheck::Invalid);
    }

    #[test]
    fn test_token_invalid_at_exact_expiry() {
        let tokens = service();
        let now = Utc::now();
        let issued = tokens.issue_at("alice", Role::User, now).unwrap();

        let just_before = issued.expires_at - Duration::seconds(1);
        assert!(matches!(
            tokens.validate_at(&issued.token, just_before),
            TokenCheck::Valid(_)
        ));
        assert_eq!(
            tokens.validate_at(&issued.token, issued.expires_at),
            TokenCheck::Invalid
        );
    }

    #[test]
    fn test_expiry_before_issue_is_invalid() {
        let tokens = service();
        let now = Utc::now().timestamp();
        let token = tokens
            .sign(&Claims {
                exp: now + 60,
                iat: now + 120,
                role: Role::User,
                sub: "alice".to_string(),
            })
            .unwrap();

        assert_eq!(tokens.validate(&token), TokenCheck::Invalid);
    }

    #[test]
    fn test_foreign_key_is_invalid() {
        let ours = service();
        let theirs = service();
        let issued = theirs.issue("alice", Role::Admin).unwrap();

        assert_eq!(ours.validate(&issued.token), TokenCheck::Invalid);
    }

    #[test]
    fn test_tampered_token_is_invalid() {
        let tokens = service();
        let issued = tokens.issue("alice", Role::User).unwrap();

        // Swap the first signature character
        let sig_start = issued.token.rfind('.').unwrap() + 1;
        let first = &issued.token[sig_start..sig_start + 1];
        let replacement = if first == "A" { "B" } else { "A" };
        let tampered = format!(
            "{}{}{}",
            &issued.token[..sig_start],
            replacement,
            &issued.token[sig_start + 1..]
        );

        assert_eq!(tokens.validate(&tampered), TokenCheck::Invalid);

        // Re-signing the payload with an elevated role under another key fails too
        let forged = TokenService::generate(Duration::hours(10))
            .issue("alice", Role::Admin)
            .unwrap();
        let payload = forged.token.split('.').nth(1).unwrap();
        let signature = issued.token.split('.').nth(2).unwrap();
        let header = issued.token.split('.').next().unwrap();
        let spliced = format!("{header}.{payload}.{signature}");
        assert_eq!(tokens.validate(&spliced), TokenCheck::Invalid);
    }

    #[test]
    fn test_garbage_is_invalid() {
        let tokens = service();
        assert_eq!(tokens.validate(""), TokenCheck::Invalid);
        assert_eq!(tokens.validate("not-a-token"), TokenCheck::Invalid);
        assert_eq!(tokens.validate("a.b.c"), TokenCheck::Invalid);
    }

    #[test]
    fn test_shared_secret_validates_across_instances() {
        let secret = generate_signing_key();
        let a = TokenService::from_secret(&secret, Duration::hours(1));
        let b = TokenService::from_secret(&secret, Duration::hours(1));

        let issued = a.issue("bob", Role::User).unwrap();
        assert!(matches!(b.validate(&issued.token), TokenCheck::Valid(_)));
    }
}
