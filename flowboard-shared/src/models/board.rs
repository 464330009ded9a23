//! Board model and database operations
//!
//! A board is the top-level container: it has exactly one owner and a member
//! list held in the `memberships` table. Creating a board also inserts the
//! owner's membership row inside the same transaction, so a board always has
//! at least one member.
//!
//! # Schema
//!
//! ```sql
//! CREATE TABLE boards (
//!     id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
//!     title VARCHAR(255) NOT NULL,
//!     owner_id UUID NOT NULL REFERENCES users(id) ON DELETE CASCADE,
//!     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
//!     updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
//! );
//! ```
//!
//! # Example
//!
//! ```no_run
//! use flowboard_shared::models::board::{Board, CreateBoard};
//! use sqlx::PgPool;
//! use uuid::Uuid;
//!
//! # async fn example(pool: PgPool, owner: Uuid, teammate: Uuid) -> Result<(), sqlx::Error> {
//! let board = Board::create(
//!     &pool,
//!     owner,
//!     CreateBoard {
//!         title: "Launch checklist".to_string(),
//!         members: vec![teammate],
//!     },
//! )
//! .await?;
//!
//! let summaries = Board::summaries_for_user(&pool, teammate).await?;
//! assert!(summaries.iter().any(|s| s.id == board.id));
//! # Ok(())
//! # }
//! ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

/// Board row.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Board {
    /// Unique board ID (UUID v4)
    pub id: Uuid,

    /// Board title
    pub title: String,

    /// The user who created and owns the board
    pub owner_id: Uuid,

    /// When the board was created
    pub created_at: DateTime<Utc>,

    /// When the board was last updated
    pub updated_at: DateTime<Utc>,
}

/// Input for creating a new board.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateBoard {
    /// Board title
    pub title: String,

    /// Initial member user IDs (the owner is added regardless)
    #[serde(default)]
    pub members: Vec<Uuid>,
}

/// Board list projection with aggregate counts.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct BoardSummary {
    /// Board ID
    pub id: Uuid,

    /// Board title
    pub title: String,

    /// Owner user ID
    pub owner_id: Uuid,

    /// Number of membership rows
    pub member_count: i64,

    /// Number of tasks on the board
    pub ticket_count: i64,

    /// Number of tasks still in the to-do column
    pub tasks_to_do_count: i64,

    /// Number of high-priority tasks
    pub tasks_high_prio_count: i64,
}

impl Board {
    /// Creates a board owned by `owner_id`.
    ///
    /// Runs in a transaction: the board row, the owner's membership row, and
    /// a membership row per entry in `data.members` are inserted atomically.
    /// Caller is responsible for verifying that the member IDs exist.
    ///
    /// # Errors
    ///
    /// Returns an error if any insert fails (e.g. a member ID violates the
    /// users foreign key); nothing is persisted in that case.
    pub async fn create(
        pool: &PgPool,
        owner_id: Uuid,
        data: CreateBoard,
    ) -> Result<Self, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let board = sqlx::query_as::<_, Board>(
            r#"
            INSERT INTO boards (title, owner_id)
            VALUES ($1, $2)
            RETURNING id, title, owner_id, created_at, updated_at
            "#,
        )
        .bind(&data.title)
        .bind(owner_id)
        .fetch_one(&mut *tx)
        .await?;

        // Owner membership first: the invariant is that a board always has
        // at least one member.
        sqlx::query(
            "INSERT INTO memberships (board_id, user_id) VALUES ($1, $2)
             ON CONFLICT (board_id, user_id) DO NOTHING",
        )
        .bind(board.id)
        .bind(owner_id)
        .execute(&mut *tx)
        .await?;

        for member_id in &data.members {
            sqlx::query(
                "INSERT INTO memberships (board_id, user_id) VALUES ($1, $2)
                 ON CONFLICT (board_id, user_id) DO NOTHING",
            )
            .bind(board.id)
            .bind(member_id)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;

        Ok(board)
    }

    /// Finds a board by ID.
    pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        let board = sqlx::query_as::<_, Board>(
            r#"
            SELECT id, title, owner_id, created_at, updated_at
            FROM boards
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(pool)
        .await?;

        Ok(board)
    }

    /// Lists board summaries for every board the user owns or belongs to.
    pub async fn summaries_for_user(
        pool: &PgPool,
        user_id: Uuid,
    ) -> Result<Vec<BoardSummary>, sqlx::Error> {
        let summaries = sqlx::query_as::<_, BoardSummary>(
            r#"
            SELECT b.id,
                   b.title,
                   b.owner_id,
                   (SELECT COUNT(*) FROM memberships m WHERE m.board_id = b.id) AS member_count,
                   (SELECT COUNT(*) FROM tasks t WHERE t.board_id = b.id) AS ticket_count,
                   (SELECT COUNT(*) FROM tasks t
                     WHERE t.board_id = b.id AND t.status = 'todo') AS tasks_to_do_count,
                   (SELECT COUNT(*) FROM tasks t
                     WHERE t.board_id = b.id AND t.priority = 'high') AS tasks_high_prio_count
            FROM boards b
            WHERE b.owner_id = $1
               OR EXISTS (SELECT 1 FROM memberships m
                           WHERE m.board_id = b.id AND m.user_id = $1)
            ORDER BY b.created_at ASC
            "#,
        )
        .bind(user_id)
        .fetch_all(pool)
        .await?;

        Ok(summaries)
    }

    /// Renames a board.
    ///
    /// Returns the updated board, or `None` if it does not exist.
    pub async fn rename(
        pool: &PgPool,
        id: Uuid,
        title: &str,
    ) -> Result<Option<Self>, sqlx::Error> {
        let board = sqlx::query_as::<_, Board>(
            r#"
            UPDATE boards
            SET title = $2, updated_at = NOW()
            WHERE id = $1
            RETURNING id, title, owner_id, created_at, updated_at
            "#,
        )
        .bind(id)
        .bind(title)
        .fetch_optional(pool)
        .await?;

        Ok(board)
    }

    /// Deletes a board.
    ///
    /// Tasks, comments, and membership rows cascade.
    pub async fn delete(pool: &PgPool, id: Uuid) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM boards WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn create_board_members_default_to_empty() {
        let data: CreateBoard = serde_json::from_str(r#"{"title": "Roadmap"}"#).unwrap();
        assert_eq!(data.title, "Roadmap");
        assert!(data.members.is_empty());
    }

    // Database-backed tests live in tests/db_integration_tests.rs
}
