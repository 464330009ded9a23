//! Authentication and authorization
//!
//! # Modules
//!
//! - [`password`]: Argon2id password hashing and strength validation
//! - [`jwt`]: JWT access/refresh token generation and validation
//! - [`middleware`]: Axum extractor resolving the acting user from a Bearer
//!   token
//! - [`authorization`]: the pure permission evaluator for boards, tasks, and
//!   comments
//!
//! Authentication (who is calling) and authorization (what they may do) are
//! kept apart: the middleware produces a [`middleware::CurrentUser`], and
//! handlers pass that user id explicitly into
//! [`authorization::evaluate`] together with a resolved snapshot of the
//! target resource. Nothing in this tree reads ambient state.
//!
//! # Example
//!
//! ```no_run
//! use flowboard_shared::auth::password::{hash_password, verify_password};
//! use flowboard_shared::auth::jwt::{create_token, Claims, TokenType};
//! use uuid::Uuid;
//!
//! # fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let hash = hash_password("user_password")?;
//! assert!(verify_password("user_password", &hash)?);
//!
//! let claims = Claims::new(Uuid::new_v4(), TokenType::Access);
//! let token = create_token(&claims, "secret-key-at-least-32-bytes-long")?;
//! # Ok(())
//! # }
//! ```

pub mod authorization;
pub mod jwt;
pub mod middleware;
pub mod password;
