//! Authentication endpoints
//!
//! # Endpoints
//!
//! - `POST /api/auth/register` - register a new user
//! - `POST /api/auth/login` - log in and get tokens
//! - `POST /api/auth/refresh` - refresh an access token
//! - `GET  /api/auth/email-check` - look up a user by email (authenticated)

use crate::{
    app::AppState,
    error::{ApiError, ApiResult, ValidationErrorDetail},
    routes::validation_error,
};
use axum::{
    extract::{Query, State},
    Json,
};
use flowboard_shared::{
    auth::{jwt, password},
    models::user::{CreateUser, User, UserSummary},
};
use serde::{Deserialize, Serialize};
use validator::Validate;

/// Register request.
#[derive(Debug, Deserialize, Validate)]
pub struct RegisterRequest {
    /// Email address
    #[validate(email(message = "Invalid email format"))]
    pub email: String,

    /// Password
    #[validate(length(min = 8, message = "Password must be at least 8 characters"))]
    pub password: String,

    /// Password again, to catch typos
    pub repeated_password: String,

    /// Full name ("First Last")
    #[validate(length(max = 255, message = "Name must be at most 255 characters"))]
    pub fullname: String,
}

/// Tokens plus the user they identify; returned by register and login.
#[derive(Debug, Serialize)]
pub struct AuthResponse {
    /// User ID
    pub user_id: String,

    /// Full display name
    pub fullname: String,

    /// Email address
    pub email: String,

    /// Access token (24h)
    pub access_token: String,

    /// Refresh token (30d)
    pub refresh_token: String,
}

/// Login request.
#[derive(Debug, Deserialize, Validate)]
pub struct LoginRequest {
    /// Email address
    #[validate(email(message = "Invalid email format"))]
    pub email: String,

    /// Password
    pub password: String,
}

/// Refresh token request.
#[derive(Debug, Deserialize)]
pub struct RefreshRequest {
    /// Refresh token
    pub refresh_token: String,
}

/// Refresh token response.
#[derive(Debug, Serialize)]
pub struct RefreshResponse {
    /// New access token (24h)
    pub access_token: String,
}

/// Email lookup query.
#[derive(Debug, Deserialize)]
pub struct EmailCheckQuery {
    /// Email address to look up
    pub email: String,
}

fn issue_tokens(user: &User, secret: &str) -> ApiResult<AuthResponse> {
    let access_claims = jwt::Claims::new(user.id, jwt::TokenType::Access);
    let refresh_claims = jwt::Claims::new(user.id, jwt::TokenType::Refresh);

    Ok(AuthResponse {
        user_id: user.id.to_string(),
        fullname: user.name.clone(),
        email: user.email.clone(),
        access_token: jwt::create_token(&access_claims, secret)?,
        refresh_token: jwt::create_token(&refresh_claims, secret)?,
    })
}

/// Registers a new user.
///
/// The full name must contain a first and a last name; the two password
/// fields must match and meet the strength rules.
///
/// # Errors
///
/// - `409 Conflict`: email already registered
/// - `422 Unprocessable Entity`: validation failed
pub async fn register(
    State(state): State<AppState>,
    Json(req): Json<RegisterRequest>,
) -> ApiResult<Json<AuthResponse>> {
    req.validate().map_err(validation_error)?;

    let fullname = req.fullname.trim();
    if fullname.split_whitespace().count() < 2 {
        return Err(ApiError::ValidationError(vec![ValidationErrorDetail {
            field: "fullname".to_string(),
            message: "Please enter your full name (first and last name)".to_string(),
        }]));
    }

    if req.password != req.repeated_password {
        return Err(ApiError::ValidationError(vec![ValidationErrorDetail {
            field: "repeated_password".to_string(),
            message: "Passwords don't match".to_string(),
        }]));
    }

    password::validate_password_strength(&req.password).map_err(|message| {
        ApiError::ValidationError(vec![ValidationErrorDetail {
            field: "password".to_string(),
            message,
        }])
    })?;

    if User::email_exists(&state.db, &req.email).await? {
        return Err(ApiError::Conflict("Email already exists".to_string()));
    }

    let password_hash = password::hash_password(&req.password)?;

    let user = User::create(
        &state.db,
        CreateUser {
            email: req.email,
            password_hash,
            name: fullname.to_string(),
        },
    )
    .await?;

    Ok(Json(issue_tokens(&user, state.jwt_secret())?))
}

/// Authenticates a user and returns JWT tokens.
///
/// # Errors
///
/// - `401 Unauthorized`: unknown email or wrong password (indistinguishable
///   on purpose)
pub async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> ApiResult<Json<AuthResponse>> {
    req.validate().map_err(validation_error)?;

    let user = User::find_by_email(&state.db, &req.email)
        .await?
        .ok_or_else(|| ApiError::Unauthorized("Invalid email or password".to_string()))?;

    let valid = password::verify_password(&req.password, &user.password_hash)?;
    if !valid {
        return Err(ApiError::Unauthorized(
            "Invalid email or password".to_string(),
        ));
    }

    User::update_last_login(&state.db, user.id).await?;

    Ok(Json(issue_tokens(&user, state.jwt_secret())?))
}

/// Exchanges a refresh token for a new access token.
///
/// # Errors
///
/// - `401 Unauthorized`: invalid or expired refresh token
pub async fn refresh(
    State(state): State<AppState>,
    Json(req): Json<RefreshRequest>,
) -> ApiResult<Json<RefreshResponse>> {
    let access_token = jwt::refresh_access_token(&req.refresh_token, state.jwt_secret())?;

    Ok(Json(RefreshResponse { access_token }))
}

/// Looks up a user summary by email.
///
/// Used by board owners to resolve a teammate's account before adding them
/// to the member list.
///
/// # Errors
///
/// - `404 Not Found`: no account with that email
pub async fn email_check(
    State(state): State<AppState>,
    Query(query): Query<EmailCheckQuery>,
) -> ApiResult<Json<UserSummary>> {
    let user = User::find_by_email(&state.db, &query.email)
        .await?
        .ok_or_else(|| ApiError::NotFound("No account with this email".to_string()))?;

    Ok(Json(UserSummary::from(&user)))
}
