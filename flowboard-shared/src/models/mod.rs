//! Database models for Flowboard
//!
//! This module contains all database models and their CRUD operations.
//!
//! # Models
//!
//! - `user`: User accounts
//! - `board`: Kanban boards with an owner and a member list
//! - `membership`: User-board relationship rows
//! - `task`: Tasks on a board with status, priority, assignee, and reviewer
//! - `comment`: Comments on a task
//!
//! # Example
//!
//! ```no_run
//! use flowboard_shared::models::board::{Board, CreateBoard};
//! use sqlx::PgPool;
//! use uuid::Uuid;
//!
//! # async fn example(pool: PgPool, owner_id: Uuid) -> Result<(), sqlx::Error> {
//! let board = Board::create(
//!     &pool,
//!     owner_id,
//!     CreateBoard {
//!         title: "Sprint 12".to_string(),
//!         members: vec![],
//!     },
//! )
//! .await?;
//! # Ok(())
//! # }
//! ```

pub mod board;
pub mod comment;
pub mod membership;
pub mod task;
pub mod user;
