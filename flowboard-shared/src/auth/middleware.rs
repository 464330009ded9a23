//! Request authentication for Axum
//!
//! Resolves the acting user from the `Authorization: Bearer <token>` header.
//! On success a [`CurrentUser`] is placed into the request extensions; every
//! handler receives the acting user explicitly from there and passes it into
//! the authorization layer. There is no global "current user".
//!
//! # Example
//!
//! ```no_run
//! use axum::Extension;
//! use flowboard_shared::auth::middleware::CurrentUser;
//!
//! async fn handler(Extension(user): Extension<CurrentUser>) -> String {
//!     format!("acting user: {}", user.user_id)
//! }
//! ```

use axum::{
    http::{header, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use uuid::Uuid;

use super::jwt::{validate_access_token, JwtError};

/// The authenticated acting user, resolved from a Bearer access token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CurrentUser {
    /// Authenticated user ID
    pub user_id: Uuid,
}

/// Error type for request authentication.
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    /// No Authorization header on the request
    #[error("Missing authorization header")]
    MissingCredentials,

    /// Authorization header is not a Bearer token
    #[error("Expected a Bearer token")]
    InvalidFormat,

    /// Token validation failed
    #[error("Invalid token: {0}")]
    InvalidToken(#[from] JwtError),
}

impl AuthError {
    fn status(&self) -> StatusCode {
        match self {
            AuthError::InvalidFormat => StatusCode::BAD_REQUEST,
            _ => StatusCode::UNAUTHORIZED,
        }
    }
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let body = Json(json!({
            "error": "unauthorized",
            "message": self.to_string(),
        }));

        (self.status(), body).into_response()
    }
}

/// Resolves the acting user from request headers.
///
/// Parses the `Authorization: Bearer <token>` header and validates the token
/// as an access token against `secret`.
///
/// # Errors
///
/// - [`AuthError::MissingCredentials`] if there is no Authorization header
/// - [`AuthError::InvalidFormat`] if it is not a Bearer token
/// - [`AuthError::InvalidToken`] if validation fails (bad signature,
///   expired, refresh token presented, ...)
pub fn authenticate(headers: &HeaderMap, secret: &str) -> Result<CurrentUser, AuthError> {
    let auth_header = headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .ok_or(AuthError::MissingCredentials)?;

    let token = auth_header
        .strip_prefix("Bearer ")
        .ok_or(AuthError::InvalidFormat)?;

    let claims = validate_access_token(token, secret)?;

    Ok(CurrentUser {
        user_id: claims.sub,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::jwt::{create_token, Claims, TokenType};
    use axum::http::HeaderValue;

    const SECRET: &str = "test-secret-key-at-least-32-bytes-long";

    fn headers_with(value: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(header::AUTHORIZATION, HeaderValue::from_str(value).unwrap());
        headers
    }

    #[test]
    fn resolves_user_from_bearer_token() {
        let user_id = Uuid::new_v4();
        let claims = Claims::new(user_id, TokenType::Access);
        let token = create_token(&claims, SECRET).unwrap();

        let user = authenticate(&headers_with(&format!("Bearer {}", token)), SECRET).unwrap();
        assert_eq!(user.user_id, user_id);
    }

    #[test]
    fn missing_header_is_rejected() {
        let result = authenticate(&HeaderMap::new(), SECRET);
        assert!(matches!(result, Err(AuthError::MissingCredentials)));
    }

    #[test]
    fn non_bearer_header_is_rejected() {
        let result = authenticate(&headers_with("Basic dXNlcjpwYXNz"), SECRET);
        assert!(matches!(result, Err(AuthError::InvalidFormat)));
    }

    #[test]
    fn refresh_token_is_rejected() {
        let claims = Claims::new(Uuid::new_v4(), TokenType::Refresh);
        let token = create_token(&claims, SECRET).unwrap();

        let result = authenticate(&headers_with(&format!("Bearer {}", token)), SECRET);
        assert!(matches!(result, Err(AuthError::InvalidToken(_))));
    }
}
