//! Request authentication
//!
//! `authenticate` runs in front of every route. It reads a bearer token from
//! the `Authorization` header and attaches an [`AuthContext`] to the request.
//! It never rejects: routes that need a caller say so by taking the
//! [`Authenticated`] or [`AdminOnly`] extractor, which turn a missing identity
//! into 401 and a non-admin identity into 403.

use axum::{
    async_trait,
    body::Body,
    extract::{FromRequestParts, State},
    http::{header::AUTHORIZATION, request::Parts, HeaderMap, Request},
    middleware::Next,
    response::Response,
};
use std::sync::Arc;

use crate::api::response::ApiError;
use crate::tokens::{Identity, TokenCheck, TokenService};
use crate::AppState;

const BEARER_SCHEME: &str = "Bearer";

/// Who is making the request, as established by `authenticate`
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthContext {
    Anonymous,
    Authenticated(Identity),
}

/// Attach an [`AuthContext`] to the request unless one is already present.
pub async fn authenticate(
    State(state): State<Arc<AppState>>,
    mut request: Request<Body>,
    next: Next,
) -> Response {
    if request.extensions().get::<AuthContext>().is_none() {
        let context = resolve(&state.tokens, request.headers());
        request.extensions_mut().insert(context);
    }
    next.run(request).await
}

fn resolve(tokens: &TokenService, headers: &HeaderMap) -> AuthContext {
    let Some(token) = bearer_token(headers) else {
        return AuthContext::Anonymous;
    };

    match tokens.validate(token) {
        TokenCheck::Valid(identity) => AuthContext::Authenticated(identity),
        TokenCheck::Invalid => AuthContext::Anonymous,
    }
}

/// Extract the token from `Authorization: Bearer <token>`.
///
/// The scheme is matched case-insensitively. Any other scheme, or an empty
/// token, yields `None`.
pub fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    let value = headers.get(AUTHORIZATION)?.to_str().ok()?;
    let (scheme, token) = value.trim().split_once(' ')?;
    if !scheme.eq_ignore_ascii_case(BEARER_SCHEME) {
        return None;
    }
    let token = token.trim();
    (!token.is_empty()).then_some(token)
}

// ============================================================================
// Extractors
// ============================================================================

/// Any authenticated caller
#[derive(Debug, Clone)]
pub struct Authenticated(pub Identity);

#[async_trait]
impl<S: Send + Sync> FromRequestParts<S> for Authenticated {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        match parts.extensions.get::<AuthContext>() {
            Some(AuthContext::Authenticated(identity)) => Ok(Authenticated(identity.clone())),
            _ => {
                tracing::debug!(path = %parts.uri.path(), "Rejected unauthenticated request");
                Err(ApiError::unauthorized("Authentication required"))
            }
        }
    }
}

/// An authenticated caller holding the ADMIN role
#[derive(Debug, Clone)]
pub struct AdminOnly(pub Identity);

#[async_trait]
impl<S: Send + Sync> FromRequestParts<S> for AdminOnly {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Authenticated(identity) = Authenticated::from_request_parts(parts, state).await?;
        if !identity.is_admin() {
            tracing::info!(subject = %identity.subject, path = %parts.uri.path(), "Rejected non-admin request");
            return Err(ApiError::forbidden("Admin role required"));
        }
        Ok(AdminOnly(identity))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::models::Role;
    use axum::http::HeaderValue;
    use chrono::Duration;

    fn headers(value: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, HeaderValue::from_str(value).unwrap());
        headers
    }

    #[test]
    fn test_bearer_token_parsing() {
        assert_eq!(bearer_token(&headers("Bearer abc.def")), Some("abc.def"));
        assert_eq!(bearer_token(&headers("bearer abc")), Some("abc"));
        assert_eq!(bearer_token(&headers("Basic abc")), None);
        assert_eq!(bearer_token(&headers("Bearer ")), None);
        assert_eq!(bearer_token(&headers("Bearer")), None);
        assert_eq!(bearer_token(&HeaderMap::new()), None);
    }

    #[test]
    fn test_resolve_valid_token() {
        let tokens = TokenService::generate(Duration::hours(1));
        let issued = tokens.issue("alice", Role::Admin).unwrap();

        let context = resolve(&tokens, &headers(&format!("Bearer {}", issued.token)));
        assert_eq!(
            context,
            AuthContext::Authenticated(Identity {
                role: Role::Admin,
                subject: "alice".to_string(),
            })
        );
    }

    #[test]
    fn test_resolve_invalid_token_is_anonymous() {
        let tokens = TokenService::generate(Duration::hours(1));
        assert_eq!(
            resolve(&tokens, &headers("Bearer not-a-token")),
            AuthContext::Anonymous
        );
        assert_eq!(resolve(&tokens, &HeaderMap::new()), AuthContext::Anonymous);
    }

    #[tokio::test]
    async fn test_admin_only_rejects_user() {
        let request = Request::builder()
            .uri("/api/sweets/1")
            .extension(AuthContext::Authenticated(Identity {
                role: Role::User,
                subject: "bob".to_string(),
            }))
            .body(())
            .unwrap();
        let (mut parts, _) = request.into_parts();

        let err = AdminOnly::from_request_parts(&mut parts, &()).await.unwrap_err();
        assert_eq!(err.status(), axum::http::StatusCode::FORBIDDEN);

        let user = Authenticated::from_request_parts(&mut parts, &()).await.unwrap();
        assert_eq!(user.0.subject, "bob");
    }

    #[tokio::test]
    async fn test_anonymous_is_unauthorized() {
        let request = Request::builder()
            .uri("/api/sweets")
            .extension(AuthContext::Anonymous)
            .body(())
            .unwrap();
        let (mut parts, _) = request.into_parts();

        let err = Authenticated::from_request_parts(&mut parts, &()).await.unwrap_err();
        assert_eq!(err.status(), axum::http::StatusCode::UNAUTHORIZED);

        let err = AdminOnly::from_request_parts(&mut parts, &()).await.unwrap_err();
        assert_eq!(err.status(), axum::http::StatusCode::UNAUTHORIZED);
    }
}
