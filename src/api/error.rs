use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use std::fmt;

use super::ApiResponse;
use crate::clients::blob::BlobError;
use crate::db::DbFailure;
use crate::services::{AuthError, ContactError, ProductError, TokenError};

/// Internal detail attached to error responses. Only rendered into the body
/// when the server runs with `expose_error_details`.
#[derive(Debug, Clone)]
pub struct ErrorDetail(pub String);

#[derive(Debug)]
pub enum ApiError {
    ValidationError(String),

    Unauthorized(String),

    NotFound(String),

    Conflict { message: String, detail: String },

    ServiceUnavailable { message: String, detail: String },

    InternalError { message: String, detail: String },
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ValidationError(msg) => write!(f, "Validation error: {msg}"),
            Self::Unauthorized(msg) => write!(f, "Unauthorized: {msg}"),
            Self::NotFound(msg) => write!(f, "Not found: {msg}"),
            Self::Conflict { message, detail } => write!(f, "Conflict: {message} ({detail})"),
            Self::ServiceUnavailable { message, detail } => {
                write!(f, "Service unavailable: {message} ({detail})")
            }
            Self::InternalError { message, detail } => {
                write!(f, "Internal error: {message} ({detail})")
            }
        }
    }
}

impl std::error::Error for ApiError {}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message, detail) = match self {
            Self::ValidationError(msg) => (StatusCode::BAD_REQUEST, msg, None),
            Self::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, msg, None),
            Self::NotFound(msg) => (StatusCode::NOT_FOUND, msg, None),
            Self::Conflict { message, detail } => (StatusCode::CONFLICT, message, Some(detail)),
            Self::ServiceUnavailable { message, detail } => {
                tracing::warn!(detail = %detail, "{}", message);
                (StatusCode::SERVICE_UNAVAILABLE, message, Some(detail))
            }
            Self::InternalError { message, detail } => {
                tracing::error!(detail = %detail, "{}", message);
                (StatusCode::INTERNAL_SERVER_ERROR, message, Some(detail))
            }
        };

        let mut response = (status, Json(ApiResponse::error(message))).into_response();
        if let Some(detail) = detail {
            response.extensions_mut().insert(ErrorDetail(detail));
        }
        response
    }
}

impl ApiError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::ValidationError(msg.into())
    }

    pub fn unauthorized(msg: impl Into<String>) -> Self {
        Self::Unauthorized(msg.into())
    }

    pub fn not_found(resource: &str) -> Self {
        Self::NotFound(format!("{resource} not found"))
    }

    pub fn internal(detail: impl Into<String>) -> Self {
        Self::InternalError {
            message: "Internal Server Error".to_string(),
            detail: detail.into(),
        }
    }
}

impl From<anyhow::Error> for ApiError {
    fn from(err: anyhow::Error) -> Self {
        DbFailure::classify(&err).into()
    }
}

impl From<DbFailure> for ApiError {
    fn from(err: DbFailure) -> Self {
        let detail = err.detail().to_string();
        match err {
            DbFailure::Conflict(_) => Self::Conflict {
                message: "This record already exists".to_string(),
                detail,
            },
            DbFailure::InvalidData(_) => Self::ValidationError("Invalid data format provided".to_string()),
            DbFailure::Unavailable(_) => Self::ServiceUnavailable {
                message: "Database connection failed".to_string(),
                detail,
            },
            DbFailure::Other(_) => Self::InternalError {
                message: "Database error occurred".to_string(),
                detail,
            },
        }
    }
}

impl From<BlobError> for ApiError {
    fn from(err: BlobError) -> Self {
        match err {
            BlobError::Rejected(msg) => Self::ValidationError(msg),
            BlobError::Unavailable(detail) | BlobError::Provider(detail) => {
                Self::ServiceUnavailable {
                    message: "Image storage is unavailable".to_string(),
                    detail,
                }
            }
            BlobError::Io(e) => Self::internal(format!("Image storage I/O error: {e}")),
        }
    }
}

impl From<TokenError> for ApiError {
    fn from(err: TokenError) -> Self {
        match err {
            TokenError::Expired => Self::unauthorized("Token expired. Please login again."),
            TokenError::Unauthorized | TokenError::Invalid(_) => Self::unauthorized("Invalid token."),
        }
    }
}

impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::Validation(msg) => Self::ValidationError(msg),
            AuthError::InvalidCredentials => Self::unauthorized("Invalid credentials"),
            AuthError::AdminNotFound => Self::not_found("Admin"),
            AuthError::Token(e) => Self::internal(format!("Failed to issue token: {e}")),
            AuthError::Database(e) => e.into(),
        }
    }
}

impl From<ContactError> for ApiError {
    fn from(err: ContactError) -> Self {
        match err {
            ContactError::Validation(msg) => Self::ValidationError(msg),
            ContactError::NotFound => Self::not_found("Contact"),
            ContactError::Database(e) => e.into(),
        }
    }
}

impl From<ProductError> for ApiError {
    fn from(err: ProductError) -> Self {
        match err {
            ProductError::Validation(msg) => Self::ValidationError(msg),
            ProductError::NotFound => Self::not_found("Product"),
            ProductError::Blob(e) => e.into(),
            ProductError::Database(e) => e.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        let cases = [
            (ApiError::validation("x"), StatusCode::BAD_REQUEST),
            (ApiError::unauthorized("x"), StatusCode::UNAUTHORIZED),
            (ApiError::not_found("Product"), StatusCode::NOT_FOUND),
            (
                DbFailure::Conflict("dup".into()).into(),
                StatusCode::CONFLICT,
            ),
            (
                DbFailure::Unavailable("down".into()).into(),
                StatusCode::SERVICE_UNAVAILABLE,
            ),
            (
                DbFailure::InvalidData("bad".into()).into(),
                StatusCode::BAD_REQUEST,
            ),
            (
                DbFailure::Other("boom".into()).into(),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
            (
                BlobError::Unavailable("timeout".into()).into(),
                StatusCode::SERVICE_UNAVAILABLE,
            ),
        ];

        for (error, status) in cases {
            assert_eq!(error.into_response().status(), status);
        }
    }

    #[test]
    fn test_internal_errors_carry_detail_extension() {
        let response = ApiError::internal("disk full").into_response();
        let detail = response.extensions().get::<ErrorDetail>().unwrap();
        assert_eq!(detail.0, "disk full");

        let response = ApiError::validation("bad").into_response();
        assert!(response.extensions().get::<ErrorDetail>().is_none());
    }

    #[test]
    fn test_token_errors_map_to_messages() {
        assert_eq!(
            ApiError::from(TokenError::Expired).to_string(),
            "Unauthorized: Token expired. Please login again."
        );
        assert_eq!(
            ApiError::from(TokenError::Unauthorized).to_string(),
            "Unauthorized: Invalid token."
        );
    }
}
