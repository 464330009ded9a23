//! Application state and router builder
//!
//! # Example
//!
//! ```no_run
//! use flowboard_api::{app::{build_router, AppState}, config::Config};
//! use sqlx::PgPool;
//!
//! # async fn example() -> anyhow::Result<()> {
//! let config = Config::from_env()?;
//! let pool = PgPool::connect(&config.database.url).await?;
//! let state = AppState::new(pool, config);
//! let app = build_router(state);
//!
//! let listener = tokio::net::TcpListener::bind("0.0.0.0:8080").await?;
//! axum::serve(listener, app).await?;
//! # Ok(())
//! # }
//! ```

use crate::config::Config;
use axum::{
    extract::{Request, State},
    http::{header, HeaderValue, Method},
    middleware::Next,
    response::Response,
    routing::{delete, get, patch, post},
    Router,
};
use flowboard_shared::auth::middleware::authenticate;
use sqlx::PgPool;
use std::sync::Arc;
use tower_http::{
    cors::CorsLayer,
    trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer},
};
use tracing::Level;

/// Shared application state.
///
/// Cloned per request via Axum's `State` extractor; `Arc` keeps the clone
/// cheap.
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool
    pub db: PgPool,

    /// Application configuration
    pub config: Arc<Config>,
}

impl AppState {
    /// Creates new application state.
    pub fn new(db: PgPool, config: Config) -> Self {
        Self {
            db,
            config: Arc::new(config),
        }
    }

    /// JWT secret for token operations.
    pub fn jwt_secret(&self) -> &str {
        &self.config.jwt.secret
    }
}

/// Builds the complete Axum router.
///
/// # Routes
///
/// ```text
/// /
/// ├── /health                          # liveness + DB check (public)
/// └── /api/
///     ├── /auth/
///     │   ├── POST /register           # public
///     │   ├── POST /login              # public
///     │   ├── POST /refresh            # public
///     │   └── GET  /email-check        # authenticated
///     ├── /boards/                     # authenticated
///     │   ├── GET    /                 # boards of the current user
///     │   ├── POST   /                 # create board
///     │   ├── GET    /:id              # detail with members and tasks
///     │   ├── PATCH  /:id              # rename / replace member list
///     │   └── DELETE /:id              # owner only
///     └── /tasks/                      # authenticated
///         ├── POST   /                 # create task
///         ├── GET    /assigned-to-me
///         ├── GET    /reviewing
///         ├── PATCH  /:id
///         ├── DELETE /:id
///         ├── GET    /:id/comments
///         ├── POST   /:id/comments
///         └── DELETE /:id/comments/:comment_id
/// ```
///
/// Middleware, outermost first: request tracing, CORS, security headers.
/// Authentication applies per route group.
pub fn build_router(state: AppState) -> Router {
    use crate::routes;

    let health_routes = Router::new().route("/health", get(routes::health::health_check));

    // Public: credentials in, tokens out.
    let auth_public = Router::new()
        .route("/register", post(routes::auth::register))
        .route("/login", post(routes::auth::login))
        .route("/refresh", post(routes::auth::refresh));

    // Email lookup is for picking board members, so it requires a session.
    let auth_protected = Router::new()
        .route("/email-check", get(routes::auth::email_check))
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            bearer_auth_layer,
        ));

    let board_routes = Router::new()
        .route("/", get(routes::boards::list_boards))
        .route("/", post(routes::boards::create_board))
        .route("/:id", get(routes::boards::board_detail))
        .route("/:id", patch(routes::boards::update_board))
        .route("/:id", delete(routes::boards::delete_board))
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            bearer_auth_layer,
        ));

    let task_routes = Router::new()
        .route("/", post(routes::tasks::create_task))
        .route("/assigned-to-me", get(routes::tasks::assigned_to_me))
        .route("/reviewing", get(routes::tasks::reviewing))
        .route("/:id", patch(routes::tasks::update_task))
        .route("/:id", delete(routes::tasks::delete_task))
        .route("/:id/comments", get(routes::comments::list_comments))
        .route("/:id/comments", post(routes::comments::create_comment))
        .route(
            "/:id/comments/:comment_id",
            delete(routes::comments::delete_comment),
        )
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            bearer_auth_layer,
        ));

    let api_routes = Router::new()
        .nest("/auth", auth_public.merge(auth_protected))
        .nest("/boards", board_routes)
        .nest("/tasks", task_routes);

    let cors = if state.config.api.cors_origins.contains(&"*".to_string()) {
        CorsLayer::permissive()
    } else {
        let origins: Vec<HeaderValue> = state
            .config
            .api
            .cors_origins
            .iter()
            .filter_map(|origin| origin.parse().ok())
            .collect();

        CorsLayer::new()
            .allow_origin(origins)
            .allow_methods([
                Method::GET,
                Method::POST,
                Method::PATCH,
                Method::DELETE,
                Method::OPTIONS,
            ])
            .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE])
            .allow_credentials(true)
            .max_age(std::time::Duration::from_secs(3600))
    };

    Router::new()
        .merge(health_routes)
        .nest("/api", api_routes)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .layer(cors)
        .layer(axum::middleware::from_fn(
            crate::middleware::security::security_headers,
        ))
        .with_state(state)
}

/// Bearer-token authentication layer.
///
/// Resolves the acting user from the Authorization header and injects a
/// `CurrentUser` into request extensions; handlers receive the actor from
/// there and pass it explicitly into every authorization check.
async fn bearer_auth_layer(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, crate::error::ApiError> {
    let current_user = authenticate(req.headers(), state.jwt_secret())?;

    req.extensions_mut().insert(current_user);

    Ok(next.run(req).await)
}
