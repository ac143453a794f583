//! Bearer-token authentication middleware
//!
//! Per request: no header → `Unauthorized`; bad or expired token →
//! `InvalidToken`; token fine but account gone → `NotFound`; otherwise the
//! resolved [`AuthUser`] is attached as a request extension and the handler
//! runs. Rejections happen before the handler sees the request.

use axum::{
    extract::{Request, State},
    http::{header, HeaderMap},
    middleware::Next,
    response::Response,
};
use time::OffsetDateTime;
use toolgate_shared::User;

use super::{CredentialStore, JwtManager};
use crate::error::ApiError;

/// State needed by the auth middleware
#[derive(Clone)]
pub struct AuthState {
    pub credentials: CredentialStore,
    pub tokens: JwtManager,
}

/// The authenticated caller, resolved from the bearer token
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub user: User,
    /// `jti` of the presented token
    pub token_id: String,
    pub expires_at: OffsetDateTime,
}

impl AuthUser {
    pub fn username(&self) -> &str {
        &self.user.username
    }
}

/// Pull the token out of `Authorization: Bearer <token>`
pub fn extract_bearer(headers: &HeaderMap) -> Option<&str> {
    let value = headers.get(header::AUTHORIZATION)?.to_str().ok()?;
    let (scheme, token) = value.trim().split_once(' ')?;
    if !scheme.eq_ignore_ascii_case("bearer") {
        return None;
    }

    let token = token.trim();
    (!token.is_empty()).then_some(token)
}

/// Middleware that requires a valid bearer token
pub async fn require_auth(
    State(auth): State<AuthState>,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let token = extract_bearer(request.headers()).ok_or(ApiError::Unauthorized)?;

    let claims = auth.tokens.verify(token).map_err(|e| {
        tracing::debug!(error = %e, "Rejected bearer token");
        ApiError::from(e)
    })?;

    let user = auth.credentials.find(&claims.sub).await?;
    if !user.is_active {
        return Err(ApiError::AccountDisabled);
    }

    let expires_at = OffsetDateTime::from_unix_timestamp(claims.exp)
        .map_err(|e| ApiError::Internal(e.to_string()))?;

    request.extensions_mut().insert(AuthUser {
        user,
        token_id: claims.jti,
        expires_at,
    });

    Ok(next.run(request).await)
}
