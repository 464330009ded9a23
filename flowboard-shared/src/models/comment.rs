//! Comment model and database operations
//!
//! Comments belong to a task and are authored by exactly one user. Authorship
//! is checked at creation time (the author must be a member of the task's
//! board) and again on deletion (author only); both checks live in
//! [`crate::auth::authorization`].
//!
//! # Schema
//!
//! ```sql
//! CREATE TABLE comments (
//!     id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
//!     task_id UUID NOT NULL REFERENCES tasks(id) ON DELETE CASCADE,
//!     author_id UUID NOT NULL REFERENCES users(id) ON DELETE CASCADE,
//!     content TEXT NOT NULL,
//!     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
//! );
//! ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

/// Comment row.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Comment {
    /// Unique comment ID (UUID v4)
    pub id: Uuid,

    /// The task this comment is on
    pub task_id: Uuid,

    /// Who wrote the comment
    pub author_id: Uuid,

    /// Comment text
    pub content: String,

    /// When the comment was written
    pub created_at: DateTime<Utc>,
}

/// Comment row joined with the author's display name.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct CommentWithAuthor {
    /// The comment itself
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub comment: Comment,

    /// The author's full name
    pub author: String,
}

/// Input for creating a new comment.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateComment {
    /// Task to comment on
    pub task_id: Uuid,

    /// The acting user
    pub author_id: Uuid,

    /// Comment text
    pub content: String,
}

impl Comment {
    /// Creates a new comment.
    pub async fn create(pool: &PgPool, data: CreateComment) -> Result<Self, sqlx::Error> {
        let comment = sqlx::query_as::<_, Comment>(
            r#"
            INSERT INTO comments (task_id, author_id, content)
            VALUES ($1, $2, $3)
            RETURNING id, task_id, author_id, content, created_at
            "#,
        )
        .bind(data.task_id)
        .bind(data.author_id)
        .bind(data.content)
        .fetch_one(pool)
        .await?;

        Ok(comment)
    }

    /// Finds a comment by ID.
    pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        let comment = sqlx::query_as::<_, Comment>(
            r#"
            SELECT id, task_id, author_id, content, created_at
            FROM comments
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(pool)
        .await?;

        Ok(comment)
    }

    /// Lists a task's comments with author names, oldest first.
    pub async fn list_by_task(
        pool: &PgPool,
        task_id: Uuid,
    ) -> Result<Vec<CommentWithAuthor>, sqlx::Error> {
        let comments = sqlx::query_as::<_, CommentWithAuthor>(
            r#"
            SELECT c.id, c.task_id, c.author_id, c.content, c.created_at,
                   u.name AS author
            FROM comments c
            JOIN users u ON u.id = c.author_id
            WHERE c.task_id = $1
            ORDER BY c.created_at ASC
            "#,
        )
        .bind(task_id)
        .fetch_all(pool)
        .await?;

        Ok(comments)
    }

    /// Counts comments on a task.
    pub async fn count_by_task(pool: &PgPool, task_id: Uuid) -> Result<i64, sqlx::Error> {
        let (count,): (i64,) =
            sqlx::query_as("SELECT COUNT(*) FROM comments WHERE task_id = $1")
                .bind(task_id)
                .fetch_one(pool)
                .await?;

        Ok(count)
    }

    /// Deletes a comment.
    pub async fn delete(pool: &PgPool, id: Uuid) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM comments WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}

// Database-backed tests live in tests/db_integration_tests.rs
