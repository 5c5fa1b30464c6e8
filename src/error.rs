//! HTTP-facing error type. Every handler returns `Result<_, ApiError>`.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use thiserror::Error;

use crate::auth::AuthError;
use crate::domain::aggregates::{AttachmentError, BannerError, ReviewError};
use crate::domain::value_objects::{MediaKindError, PhoneNumberError, RatingError};
use crate::repository::RepositoryError;
use crate::verification::VerificationError;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    BadRequest(String),
    #[error("{0}")]
    Unauthorized(String),
    #[error("{0} not found")]
    NotFound(&'static str),
    #[error("{0}")]
    Internal(String),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn code(&self) -> &'static str {
        match self {
            Self::BadRequest(_) => "invalid_request",
            Self::Unauthorized(_) => "unauthorized",
            Self::NotFound(_) => "not_found",
            Self::Internal(_) => "internal_error",
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let message = match &self {
            Self::Internal(detail) => {
                tracing::error!(error = %detail, "request failed");
                "An unexpected error occurred".to_string()
            }
            other => other.to_string(),
        };
        (self.status(), Json(json!({ "error": self.code(), "message": message }))).into_response()
    }
}

impl From<RepositoryError> for ApiError {
    fn from(e: RepositoryError) -> Self { Self::Internal(e.to_string()) }
}

impl From<validator::ValidationErrors> for ApiError {
    fn from(e: validator::ValidationErrors) -> Self { Self::BadRequest(e.to_string()) }
}

impl From<ReviewError> for ApiError {
    fn from(e: ReviewError) -> Self {
        match e {
            ReviewError::Deleted => Self::NotFound("review"),
            other => Self::BadRequest(other.to_string()),
        }
    }
}

impl From<AttachmentError> for ApiError {
    fn from(e: AttachmentError) -> Self { Self::BadRequest(e.to_string()) }
}

impl From<BannerError> for ApiError {
    fn from(e: BannerError) -> Self { Self::BadRequest(e.to_string()) }
}

impl From<PhoneNumberError> for ApiError {
    fn from(e: PhoneNumberError) -> Self { Self::BadRequest(e.to_string()) }
}

impl From<RatingError> for ApiError {
    fn from(e: RatingError) -> Self { Self::BadRequest(e.to_string()) }
}

impl From<MediaKindError> for ApiError {
    fn from(e: MediaKindError) -> Self { Self::BadRequest(e.to_string()) }
}

impl From<VerificationError> for ApiError {
    fn from(e: VerificationError) -> Self { Self::Internal(e.to_string()) }
}

impl From<AuthError> for ApiError {
    fn from(e: AuthError) -> Self {
        match e {
            AuthError::Encode(msg) => Self::Internal(msg),
            other => Self::Unauthorized(other.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        assert_eq!(ApiError::from(ReviewError::Deleted).status(), StatusCode::NOT_FOUND);
        assert_eq!(ApiError::from(ReviewError::EmptyContent).status(), StatusCode::BAD_REQUEST);
        assert_eq!(ApiError::from(AuthError::MissingToken).status(), StatusCode::UNAUTHORIZED);
        assert_eq!(ApiError::NotFound("banner").to_string(), "banner not found");
    }

    #[tokio::test]
    async fn test_internal_errors_hide_detail() {
        let res = ApiError::Internal("pool timed out".into()).into_response();
        assert_eq!(res.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let body = axum::body::to_bytes(res.into_body(), usize::MAX).await.unwrap();
        let v: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(v["error"], "internal_error");
        assert_eq!(v["message"], "An unexpected error occurred");
    }
}
