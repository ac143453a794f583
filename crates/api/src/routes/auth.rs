//! Registration and login routes

use axum::{
    async_trait,
    extract::{FromRequest, Request, State},
    http::{header, StatusCode},
    Form, Json,
};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use toolgate_shared::{UserProfile, UserView};

use crate::{
    auth::validate_password,
    error::{ApiError, ApiResult},
    extract::ApiJson,
    state::AppState,
};

const MAX_USERNAME_LEN: usize = 64;
const MAX_DISPLAY_NAME_LEN: usize = 100;

// =============================================================================
// Request/Response Types
// =============================================================================

/// No `Debug`: the struct holds a raw password.
#[derive(Deserialize, JsonSchema)]
pub struct RegisterRequest {
    /// Case-sensitive, cannot be changed later
    pub username: String,
    pub password: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub display_name: Option<String>,
}

/// Also accepted as an OAuth2 password-grant form body.
#[derive(Deserialize, JsonSchema)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Serialize, Deserialize, JsonSchema)]
pub struct TokenResponse {
    pub access_token: String,
    pub token_type: String,
    /// Seconds until the token expires
    pub expires_in: i64,
    #[serde(with = "time::serde::rfc3339")]
    #[schemars(with = "String")]
    pub expires_at: OffsetDateTime,
}

/// Login body from either `application/json` or
/// `application/x-www-form-urlencoded`
pub struct LoginCredentials(pub LoginRequest);

#[async_trait]
impl<S> FromRequest<S> for LoginCredentials
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let is_form = req
            .headers()
            .get(header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(|ct| ct.starts_with("application/x-www-form-urlencoded"))
            .unwrap_or(false);

        if is_form {
            let Form(login) = Form::<LoginRequest>::from_request(req, state)
                .await
                .map_err(|e| ApiError::BadRequest(e.body_text()))?;
            Ok(Self(login))
        } else {
            let ApiJson(login) = ApiJson::<LoginRequest>::from_request(req, state).await?;
            Ok(Self(login))
        }
    }
}

// =============================================================================
// Validation
// =============================================================================

pub(crate) fn validate_username(username: &str) -> ApiResult<()> {
    if username.is_empty() || username.chars().count() > MAX_USERNAME_LEN {
        return Err(ApiError::Validation(format!(
            "Username must be between 1 and {} characters",
            MAX_USERNAME_LEN
        )));
    }
    if username.chars().any(|c| c.is_whitespace() || c.is_control()) {
        return Err(ApiError::Validation(
            "Username must not contain whitespace or control characters".to_string(),
        ));
    }
    Ok(())
}

/// Trim and check an optional email address
pub(crate) fn validate_email(email: Option<String>) -> ApiResult<Option<String>> {
    match email.map(|e| e.trim().to_string()) {
        Some(email) if !is_valid_email(&email) => {
            Err(ApiError::Validation("Invalid email format".to_string()))
        }
        other => Ok(other),
    }
}

/// Trim and check an optional display name
pub(crate) fn validate_display_name(name: Option<String>) -> ApiResult<Option<String>> {
    match name.map(|n| n.trim().to_string()) {
        Some(name) if name.is_empty() || name.chars().count() > MAX_DISPLAY_NAME_LEN => {
            Err(ApiError::Validation(format!(
                "Display name must be between 1 and {} characters",
                MAX_DISPLAY_NAME_LEN
            )))
        }
        other => Ok(other),
    }
}

fn is_valid_email(email: &str) -> bool {
    // Length checks per RFC 5321
    if email.len() > 254 || email.is_empty() {
        return false;
    }

    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };

    if local.is_empty() || local.len() > 64 {
        return false;
    }
    if local.starts_with('.') || local.ends_with('.') || local.contains("..") {
        return false;
    }
    if !local
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || "._+-".contains(c))
    {
        return false;
    }

    // Domain needs at least one dot and sane labels
    if !domain.contains('.') {
        return false;
    }
    domain.split('.').all(|label| {
        !label.is_empty()
            && label.len() <= 63
            && !label.starts_with('-')
            && !label.ends_with('-')
            && label.chars().all(|c| c.is_ascii_alphanumeric() || c == '-')
    })
}

// =============================================================================
// Handlers
// =============================================================================

/// Register a new account
pub async fn register(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<RegisterRequest>,
) -> ApiResult<(StatusCode, Json<UserView>)> {
    validate_username(&req.username)?;
    validate_password(&req.password).map_err(|e| ApiError::Validation(e.to_string()))?;

    let profile = UserProfile {
        email: validate_email(req.email)?,
        display_name: validate_display_name(req.display_name)?,
    };

    let user = state
        .credentials
        .create(&req.username, &req.password, profile)
        .await?;

    Ok((StatusCode::CREATED, Json(user.view())))
}

/// Exchange credentials for a bearer token
pub async fn login(
    State(state): State<AppState>,
    LoginCredentials(req): LoginCredentials,
) -> ApiResult<Json<TokenResponse>> {
    if !state
        .credentials
        .verify_secret(&req.username, &req.password)
        .await?
    {
        tracing::warn!(username = %req.username, "login: Invalid credentials");
        return Err(ApiError::InvalidCredentials);
    }

    // Deleted between the check and here: same answer as a wrong password
    let user = state
        .credentials
        .find(&req.username)
        .await
        .map_err(|_| ApiError::InvalidCredentials)?;

    if !user.is_active {
        tracing::warn!(username = %user.username, "login: Account disabled");
        return Err(ApiError::AccountDisabled);
    }

    let ttl = state.tokens.access_token_ttl();
    let issued = state.tokens.issue(&user.username, ttl)?;

    tracing::info!(username = %user.username, jti = %issued.jti, "login: Token issued");

    Ok(Json(TokenResponse {
        access_token: issued.token,
        token_type: "bearer".to_string(),
        expires_in: ttl.whole_seconds(),
        expires_at: issued.expires_at,
    }))
}
