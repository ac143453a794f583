//! Request extractors whose rejections render as [`ApiError`] bodies

use axum::extract::{rejection::JsonRejection, FromRequest};

use crate::error::ApiError;

/// `axum::Json`, but a malformed body becomes `400 BAD_REQUEST` in the
/// regular error envelope instead of axum's plain-text rejection
#[derive(Debug, FromRequest)]
#[from_request(via(axum::Json), rejection(ApiError))]
pub struct ApiJson<T>(pub T);

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}
