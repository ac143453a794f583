//! API error types and handling
//!
//! Error bodies carry a stable code and a public message. Internal detail
//! (token failure reason, database text, upstream errors) rides along in a
//! response extension and only reaches the body through
//! [`expose_error_detail`] when `DEBUG` is enabled.

use axum::{
    extract::{Request, State},
    http::{header, HeaderValue, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::{json, Value};
use toolgate_shared::StoreError;

use crate::{
    auth::{credentials::CredentialError, jwt::TokenError, password::PasswordError},
    search::SearchError,
    state::AppState,
};

/// Application error type
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    // Authentication errors
    #[error("Incorrect username or password")]
    InvalidCredentials,
    #[error("Could not validate credentials")]
    InvalidToken(#[source] TokenError),
    #[error("Not authenticated")]
    Unauthorized,
    #[error("Account is disabled")]
    AccountDisabled,

    // Validation errors
    #[error("Validation error: {0}")]
    Validation(String),
    #[error("Invalid request: {0}")]
    BadRequest(String),

    // Resource errors
    #[error("Resource not found")]
    NotFound(String),
    #[error("Resource already exists")]
    Conflict(String),

    // Search collaborator
    #[error("Search is not configured")]
    SearchDisabled,
    #[error("Search request timed out")]
    UpstreamTimeout,
    #[error("Search request failed")]
    Upstream(String),

    // Internal errors
    #[error("Database error: {0}")]
    Database(String),
    #[error("Internal server error")]
    Internal(String),
}

/// Code, public message and private detail of an error response
#[derive(Debug, Clone)]
pub struct ErrorDetail {
    pub code: &'static str,
    pub message: String,
    pub detail: Option<String>,
}

impl ErrorDetail {
    /// JSON body, with `detail` only when `verbose`
    pub fn body(&self, verbose: bool) -> Value {
        let mut error = json!({
            "code": self.code,
            "message": self.message,
        });
        if verbose {
            if let Some(detail) = &self.detail {
                error["detail"] = Value::String(detail.clone());
            }
        }
        json!({ "error": error })
    }
}

impl ApiError {
    fn parts(&self) -> (StatusCode, ErrorDetail) {
        let (status, code, message, detail) = match self {
            // Authentication
            ApiError::InvalidCredentials => (StatusCode::UNAUTHORIZED, "INVALID_CREDENTIALS", self.to_string(), None),
            ApiError::InvalidToken(reason) => (StatusCode::UNAUTHORIZED, "INVALID_TOKEN", self.to_string(), Some(reason.to_string())),
            ApiError::Unauthorized => (StatusCode::UNAUTHORIZED, "UNAUTHORIZED", self.to_string(), None),
            ApiError::AccountDisabled => (StatusCode::FORBIDDEN, "ACCOUNT_DISABLED", self.to_string(), None),

            // Validation
            ApiError::Validation(msg) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone(), None),
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, "BAD_REQUEST", msg.clone(), None),

            // Resources
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, "NOT_FOUND", msg.clone(), None),
            ApiError::Conflict(msg) => (StatusCode::CONFLICT, "CONFLICT", msg.clone(), None),

            // Search
            ApiError::SearchDisabled => (StatusCode::SERVICE_UNAVAILABLE, "SEARCH_DISABLED", self.to_string(), None),
            ApiError::UpstreamTimeout => (StatusCode::GATEWAY_TIMEOUT, "UPSTREAM_TIMEOUT", self.to_string(), None),
            ApiError::Upstream(detail) => (StatusCode::BAD_GATEWAY, "UPSTREAM_FAILURE", self.to_string(), Some(detail.clone())),

            // Internal
            ApiError::Database(detail) => (StatusCode::INTERNAL_SERVER_ERROR, "DATABASE_ERROR", "Database error".to_string(), Some(detail.clone())),
            ApiError::Internal(detail) => (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR", "Internal server error".to_string(), Some(detail.clone())),
        };

        (
            status,
            ErrorDetail {
                code,
                message,
                detail,
            },
        )
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, detail) = self.parts();

        if status.is_server_error() {
            tracing::error!(code = detail.code, detail = ?detail.detail, "Request failed");
        } else {
            tracing::debug!(code = detail.code, detail = ?detail.detail, "Request rejected");
        }

        let mut response = (status, Json(detail.body(false))).into_response();
        if status == StatusCode::UNAUTHORIZED {
            response
                .headers_mut()
                .insert(header::WWW_AUTHENTICATE, HeaderValue::from_static("Bearer"));
        }
        response.extensions_mut().insert(detail);
        response
    }
}

/// Middleware that rewrites error bodies to include internal detail when the
/// server runs with `DEBUG` enabled
pub async fn expose_error_detail(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Response {
    let response = next.run(request).await;
    if !state.config.debug {
        return response;
    }

    let Some(detail) = response.extensions().get::<ErrorDetail>().cloned() else {
        return response;
    };

    let (mut parts, _) = response.into_parts();
    parts.headers.remove(header::CONTENT_LENGTH);
    let body = Json(detail.body(true)).into_response().into_body();
    Response::from_parts(parts, body)
}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Conflict(_) => ApiError::Conflict("Username already registered".to_string()),
            StoreError::NotFound(_) => ApiError::NotFound("User not found".to_string()),
            StoreError::Database(detail) => ApiError::Database(detail),
        }
    }
}

impl From<PasswordError> for ApiError {
    fn from(err: PasswordError) -> Self {
        ApiError::Internal(err.to_string())
    }
}

impl From<CredentialError> for ApiError {
    fn from(err: CredentialError) -> Self {
        match err {
            CredentialError::Store(e) => e.into(),
            CredentialError::Password(e) => e.into(),
        }
    }
}

impl From<TokenError> for ApiError {
    fn from(err: TokenError) -> Self {
        match err {
            TokenError::Encoding(detail) => ApiError::Internal(detail),
            other => ApiError::InvalidToken(other),
        }
    }
}

impl From<SearchError> for ApiError {
    fn from(err: SearchError) -> Self {
        match err {
            SearchError::Timeout => ApiError::UpstreamTimeout,
            other => ApiError::Upstream(other.to_string()),
        }
    }
}

/// Result type alias for API handlers
pub type ApiResult<T> = Result<T, ApiError>;
