//! Error handling for the API server
//!
//! Provides a unified error type that maps to HTTP responses. Handlers
//! return `Result<T, ApiError>`, which converts into the appropriate status
//! code and a JSON body of the form
//! `{"error": "<code>", "message": "<text>"}`.
//!
//! Authorization denials carry the evaluator's reason code, so a 403 from a
//! membership failure is distinguishable from the categorical refusal to
//! move a task between boards.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use flowboard_shared::auth::authorization::DenyReason;
use serde::{Deserialize, Serialize};
use std::fmt;

/// API result type alias.
pub type ApiResult<T> = Result<T, ApiError>;

/// Unified API error type.
#[derive(Debug)]
pub enum ApiError {
    /// Bad request (400)
    BadRequest(String),

    /// Unauthorized (401)
    Unauthorized(String),

    /// Forbidden (403) with the evaluator's deny reason
    PermissionDenied(DenyReason),

    /// Forbidden (403) without an evaluator decision behind it
    Forbidden(String),

    /// Not found (404)
    NotFound(String),

    /// Conflict (409), e.g. duplicate email
    Conflict(String),

    /// Unprocessable entity (422), validation errors
    ValidationError(Vec<ValidationErrorDetail>),

    /// Internal server error (500)
    InternalError(String),
}

/// Validation error detail.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidationErrorDetail {
    /// Field that failed validation
    pub field: String,

    /// Error message
    pub message: String,
}

/// Error response format.
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Machine-readable error code (e.g. "not_board_member")
    pub error: String,

    /// Human-readable error message
    pub message: String,

    /// Optional validation errors
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<Vec<ValidationErrorDetail>>,
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApiError::BadRequest(msg) => write!(f, "Bad request: {}", msg),
            ApiError::Unauthorized(msg) => write!(f, "Unauthorized: {}", msg),
            ApiError::PermissionDenied(reason) => write!(f, "Forbidden: {}", reason),
            ApiError::Forbidden(msg) => write!(f, "Forbidden: {}", msg),
            ApiError::NotFound(msg) => write!(f, "Not found: {}", msg),
            ApiError::Conflict(msg) => write!(f, "Conflict: {}", msg),
            ApiError::ValidationError(errors) => {
                write!(f, "Validation failed: {} errors", errors.len())
            }
            ApiError::InternalError(msg) => write!(f, "Internal error: {}", msg),
        }
    }
}

impl std::error::Error for ApiError {}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error_code, message, details) = match self {
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, "bad_request".to_string(), msg, None),
            ApiError::Unauthorized(msg) => {
                (StatusCode::UNAUTHORIZED, "unauthorized".to_string(), msg, None)
            }
            ApiError::PermissionDenied(reason) => {
                if reason == DenyReason::MembersUnresolved {
                    // A deny for an unresolved member list means a handler
                    // failed to load relationships before asking; fail
                    // closed and flag the bug.
                    tracing::error!("authorization check ran on an unresolved member list");
                }
                (
                    StatusCode::FORBIDDEN,
                    reason.code().to_string(),
                    reason.to_string(),
                    None,
                )
            }
            ApiError::Forbidden(msg) => (StatusCode::FORBIDDEN, "forbidden".to_string(), msg, None),
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, "not_found".to_string(), msg, None),
            ApiError::Conflict(msg) => (StatusCode::CONFLICT, "conflict".to_string(), msg, None),
            ApiError::ValidationError(errors) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                "validation_error".to_string(),
                "Request validation failed".to_string(),
                Some(errors),
            ),
            ApiError::InternalError(msg) => {
                // Log internal errors but don't expose details to clients
                tracing::error!("Internal error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal_error".to_string(),
                    "An internal error occurred".to_string(),
                    None,
                )
            }
        };

        let body = Json(ErrorResponse {
            error: error_code,
            message,
            details,
        });

        (status, body).into_response()
    }
}

/// Convert sqlx errors to API errors.
impl From<sqlx::Error> for ApiError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::RowNotFound => ApiError::NotFound("Resource not found".to_string()),
            sqlx::Error::Database(db_err) => {
                if let Some(constraint) = db_err.constraint() {
                    if constraint.contains("email") {
                        return ApiError::Conflict("Email already exists".to_string());
                    }
                    return ApiError::Conflict(format!("Constraint violation: {}", constraint));
                }
                ApiError::InternalError(format!("Database error: {}", db_err))
            }
            _ => ApiError::InternalError(format!("Database error: {}", err)),
        }
    }
}

/// Convert authorization denials to API errors (403 with reason code).
impl From<DenyReason> for ApiError {
    fn from(reason: DenyReason) -> Self {
        ApiError::PermissionDenied(reason)
    }
}

/// Convert request-authentication errors to API errors.
impl From<flowboard_shared::auth::middleware::AuthError> for ApiError {
    fn from(err: flowboard_shared::auth::middleware::AuthError) -> Self {
        use flowboard_shared::auth::middleware::AuthError;

        match err {
            AuthError::MissingCredentials => {
                ApiError::Unauthorized("Missing credentials".to_string())
            }
            AuthError::InvalidFormat => ApiError::BadRequest("Expected a Bearer token".to_string()),
            AuthError::InvalidToken(e) => ApiError::Unauthorized(e.to_string()),
        }
    }
}

/// Convert password errors to API errors.
impl From<flowboard_shared::auth::password::PasswordError> for ApiError {
    fn from(err: flowboard_shared::auth::password::PasswordError) -> Self {
        ApiError::InternalError(format!("Password operation failed: {}", err))
    }
}

/// Convert JWT errors to API errors.
impl From<flowboard_shared::auth::jwt::JwtError> for ApiError {
    fn from(err: flowboard_shared::auth::jwt::JwtError) -> Self {
        use flowboard_shared::auth::jwt::JwtError;

        match err {
            JwtError::Expired => ApiError::Unauthorized("Token expired".to_string()),
            JwtError::InvalidIssuer => ApiError::Unauthorized("Invalid token issuer".to_string()),
            other => ApiError::Unauthorized(format!("Invalid token: {}", other)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display() {
        let err = ApiError::BadRequest("Invalid input".to_string());
        assert_eq!(err.to_string(), "Bad request: Invalid input");

        let err = ApiError::NotFound("Board not found".to_string());
        assert_eq!(err.to_string(), "Not found: Board not found");
    }

    #[test]
    fn deny_reason_becomes_permission_denied() {
        let err = ApiError::from(DenyReason::NotBoardOwner);
        assert!(matches!(
            err,
            ApiError::PermissionDenied(DenyReason::NotBoardOwner)
        ));
        assert!(err.to_string().contains("board owner"));
    }

    #[test]
    fn validation_error_counts() {
        let errors = vec![
            ValidationErrorDetail {
                field: "email".to_string(),
                message: "Invalid email format".to_string(),
            },
            ValidationErrorDetail {
                field: "password".to_string(),
                message: "Password too short".to_string(),
            },
        ];

        let err = ApiError::ValidationError(errors);
        assert_eq!(err.to_string(), "Validation failed: 2 errors");
    }
}
