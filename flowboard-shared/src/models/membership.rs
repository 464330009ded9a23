//! Membership model and database operations
//!
//! A membership row grants a user access to a board. The relation carries no
//! role column: the owner is recorded on the board row itself and is
//! implicitly a member of every check (the board creation path inserts an
//! owner membership row anyway, so member listings include the owner).
//!
//! # Schema
//!
//! ```sql
//! CREATE TABLE memberships (
//!     board_id UUID NOT NULL REFERENCES boards(id) ON DELETE CASCADE,
//!     user_id UUID NOT NULL REFERENCES users(id) ON DELETE CASCADE,
//!     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
//!     PRIMARY KEY (board_id, user_id)
//! );
//! ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

/// Membership row linking a user to a board.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Membership {
    /// Board ID
    pub board_id: Uuid,

    /// User ID
    pub user_id: Uuid,

    /// When the user joined the board
    pub created_at: DateTime<Utc>,
}

impl Membership {
    /// Adds a user to a board. Idempotent.
    pub async fn add(pool: &PgPool, board_id: Uuid, user_id: Uuid) -> Result<(), sqlx::Error> {
        sqlx::query(
            "INSERT INTO memberships (board_id, user_id) VALUES ($1, $2)
             ON CONFLICT (board_id, user_id) DO NOTHING",
        )
        .bind(board_id)
        .bind(user_id)
        .execute(pool)
        .await?;

        Ok(())
    }

    /// Removes a user from a board.
    ///
    /// Returns true if a row was deleted. Stored task assignments are not
    /// touched; membership is re-checked live on every authorization
    /// decision.
    pub async fn remove(pool: &PgPool, board_id: Uuid, user_id: Uuid) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM memberships WHERE board_id = $1 AND user_id = $2")
            .bind(board_id)
            .bind(user_id)
            .execute(pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Checks whether a user has a membership row on a board.
    ///
    /// Does not consider ownership; authorization goes through
    /// [`crate::auth::authorization`], which treats the owner as a member.
    pub async fn exists(pool: &PgPool, board_id: Uuid, user_id: Uuid) -> Result<bool, sqlx::Error> {
        let exists: bool = sqlx::query_scalar(
            "SELECT EXISTS(SELECT 1 FROM memberships WHERE board_id = $1 AND user_id = $2)",
        )
        .bind(board_id)
        .bind(user_id)
        .fetch_one(pool)
        .await?;

        Ok(exists)
    }

    /// Lists the user IDs of all members of a board, oldest first.
    pub async fn member_ids(pool: &PgPool, board_id: Uuid) -> Result<Vec<Uuid>, sqlx::Error> {
        let ids: Vec<Uuid> = sqlx::query_scalar(
            "SELECT user_id FROM memberships WHERE board_id = $1 ORDER BY created_at ASC",
        )
        .bind(board_id)
        .fetch_all(pool)
        .await?;

        Ok(ids)
    }

    /// Replaces a board's member list with `user_ids`.
    ///
    /// Runs in a transaction. The owner's membership is preserved no matter
    /// what the new list contains: a board always has at least one member.
    pub async fn replace(
        pool: &PgPool,
        board_id: Uuid,
        owner_id: Uuid,
        user_ids: &[Uuid],
    ) -> Result<(), sqlx::Error> {
        let mut tx = pool.begin().await?;

        sqlx::query("DELETE FROM memberships WHERE board_id = $1 AND user_id <> $2")
            .bind(board_id)
            .bind(owner_id)
            .execute(&mut *tx)
            .await?;

        for user_id in user_ids {
            sqlx::query(
                "INSERT INTO memberships (board_id, user_id) VALUES ($1, $2)
                 ON CONFLICT (board_id, user_id) DO NOTHING",
            )
            .bind(board_id)
            .bind(user_id)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;

        Ok(())
    }

    /// Counts members of a board.
    pub async fn count_for_board(pool: &PgPool, board_id: Uuid) -> Result<i64, sqlx::Error> {
        let (count,): (i64,) =
            sqlx::query_as("SELECT COUNT(*) FROM memberships WHERE board_id = $1")
                .bind(board_id)
                .fetch_one(pool)
                .await?;

        Ok(count)
    }
}

// Database-backed tests live in tests/db_integration_tests.rs
