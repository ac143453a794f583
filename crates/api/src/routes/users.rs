//! Self-service account routes
//!
//! Every handler here acts on the identity carried by the caller's token;
//! none of them accept a username from the request.

use axum::{
    extract::{Extension, State},
    http::StatusCode,
    Json,
};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use toolgate_shared::{ProfileUpdate, UserView};

use super::auth::{validate_display_name, validate_email};
use crate::{
    auth::{validate_password, AuthUser},
    error::{ApiError, ApiResult},
    extract::ApiJson,
    state::AppState,
};

#[derive(Debug, Serialize, Deserialize, JsonSchema)]
pub struct UserListResponse {
    pub users: Vec<UserView>,
    pub total: usize,
}

/// Return the authenticated caller
pub async fn read_me(Extension(auth_user): Extension<AuthUser>) -> Json<UserView> {
    Json(auth_user.user.view())
}

/// Partially update the authenticated caller
pub async fn update_me(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    ApiJson(req): ApiJson<ProfileUpdate>,
) -> ApiResult<Json<UserView>> {
    if req.is_empty() {
        return Ok(Json(auth_user.user.view()));
    }

    if let Some(password) = &req.password {
        validate_password(password).map_err(|e| ApiError::Validation(e.to_string()))?;
    }

    let update = ProfileUpdate {
        email: validate_email(req.email)?,
        display_name: validate_display_name(req.display_name)?,
        password: req.password,
    };

    let user = state
        .credentials
        .update(auth_user.username(), update)
        .await?;

    tracing::info!(username = %user.username, "Profile updated");
    Ok(Json(user.view()))
}

/// Permanently delete the authenticated caller
pub async fn delete_me(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
) -> ApiResult<StatusCode> {
    state.credentials.delete(auth_user.username()).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// List all registered accounts
pub async fn list_users(State(state): State<AppState>) -> ApiResult<Json<UserListResponse>> {
    let users: Vec<UserView> = state
        .credentials
        .list()
        .await?
        .iter()
        .map(|u| u.view())
        .collect();

    Ok(Json(UserListResponse {
        total: users.len(),
        users,
    }))
}
