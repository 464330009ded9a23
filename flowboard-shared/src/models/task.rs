//! Task model and database operations
//!
//! Tasks live on exactly one board. The board reference is immutable after
//! creation: no update statement in this module touches `board_id`, and the
//! authorization layer categorically denies board reassignment on top of
//! that.
//!
//! # Schema
//!
//! ```sql
//! CREATE TYPE task_status AS ENUM ('todo', 'in_progress', 'review', 'done');
//! CREATE TYPE task_priority AS ENUM ('low', 'medium', 'high');
//!
//! CREATE TABLE tasks (
//!     id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
//!     board_id UUID NOT NULL REFERENCES boards(id) ON DELETE CASCADE,
//!     title VARCHAR(255) NOT NULL,
//!     description TEXT NOT NULL DEFAULT '',
//!     status task_status NOT NULL DEFAULT 'todo',
//!     priority task_priority NOT NULL DEFAULT 'medium',
//!     due_date DATE,
//!     assignee_id UUID REFERENCES users(id) ON DELETE SET NULL,
//!     reviewer_id UUID REFERENCES users(id) ON DELETE SET NULL,
//!     created_by UUID REFERENCES users(id) ON DELETE SET NULL,
//!     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
//!     updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
//! );
//! ```

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

/// Kanban column a task sits in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "task_status", rename_all = "snake_case")]
#[serde(rename_all = "kebab-case")]
pub enum TaskStatus {
    /// Not started
    Todo,

    /// Being worked on
    InProgress,

    /// Waiting for review
    Review,

    /// Finished
    Done,
}

impl TaskStatus {
    /// String form as stored in the database.
    pub fn as_str(&self) -> &'static str {
        match self {
            TaskStatus::Todo => "todo",
            TaskStatus::InProgress => "in_progress",
            TaskStatus::Review => "review",
            TaskStatus::Done => "done",
        }
    }
}

/// Task priority.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "task_priority", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum TaskPriority {
    Low,
    Medium,
    High,
}

impl TaskPriority {
    /// String form as stored in the database.
    pub fn as_str(&self) -> &'static str {
        match self {
            TaskPriority::Low => "low",
            TaskPriority::Medium => "medium",
            TaskPriority::High => "high",
        }
    }
}

/// Task row.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Task {
    /// Unique task ID (UUID v4)
    pub id: Uuid,

    /// The board this task belongs to (immutable after creation)
    pub board_id: Uuid,

    /// Task title
    pub title: String,

    /// Free-form description (may be empty)
    pub description: String,

    /// Current column
    pub status: TaskStatus,

    /// Priority level
    pub priority: TaskPriority,

    /// Optional due date
    pub due_date: Option<NaiveDate>,

    /// Member the task is delegated to (optional)
    pub assignee_id: Option<Uuid>,

    /// Member reviewing the task (optional)
    pub reviewer_id: Option<Uuid>,

    /// Who created the task (NULL once that account is deleted)
    pub created_by: Option<Uuid>,

    /// When the task was created
    pub created_at: DateTime<Utc>,

    /// When the task was last updated
    pub updated_at: DateTime<Utc>,
}

/// Task row joined with its comment count.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct TaskWithCommentCount {
    /// The task itself
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub task: Task,

    /// Number of comments on the task
    pub comments_count: i64,
}

/// Input for creating a new task.
///
/// Assignee and reviewer membership is validated by the caller through the
/// authorization layer before this reaches the database.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateTask {
    /// Board to create the task on
    pub board_id: Uuid,

    /// Task title
    pub title: String,

    /// Description (defaults to empty)
    #[serde(default)]
    pub description: String,

    /// Initial column (defaults to to-do)
    #[serde(default = "default_status")]
    pub status: TaskStatus,

    /// Priority (defaults to medium)
    #[serde(default = "default_priority")]
    pub priority: TaskPriority,

    /// Optional due date
    pub due_date: Option<NaiveDate>,

    /// Optional assignee
    pub assignee_id: Option<Uuid>,

    /// Optional reviewer
    pub reviewer_id: Option<Uuid>,

    /// Creator (the acting user)
    pub created_by: Option<Uuid>,
}

fn default_status() -> TaskStatus {
    TaskStatus::Todo
}

fn default_priority() -> TaskPriority {
    TaskPriority::Medium
}

/// Input for updating a task.
///
/// `None` leaves a field unchanged. For the nullable fields (due date,
/// assignee, reviewer) the outer `Option` distinguishes "leave unchanged"
/// from "set", and the inner one allows clearing. There is intentionally no
/// `board_id` field here.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateTask {
    /// New title
    pub title: Option<String>,

    /// New description
    pub description: Option<String>,

    /// New status
    pub status: Option<TaskStatus>,

    /// New priority
    pub priority: Option<TaskPriority>,

    /// New due date (use Some(None) to clear)
    pub due_date: Option<Option<NaiveDate>>,

    /// New assignee (use Some(None) to unassign)
    pub assignee_id: Option<Option<Uuid>>,

    /// New reviewer (use Some(None) to clear)
    pub reviewer_id: Option<Option<Uuid>>,
}

impl Task {
    /// Creates a new task.
    pub async fn create(pool: &PgPool, data: CreateTask) -> Result<Self, sqlx::Error> {
        let task = sqlx::query_as::<_, Task>(
            r#"
            INSERT INTO tasks
                (board_id, title, description, status, priority, due_date,
                 assignee_id, reviewer_id, created_by)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            RETURNING id, board_id, title, description, status, priority, due_date,
                      assignee_id, reviewer_id, created_by, created_at, updated_at
            "#,
        )
        .bind(data.board_id)
        .bind(data.title)
        .bind(data.description)
        .bind(data.status)
        .bind(data.priority)
        .bind(data.due_date)
        .bind(data.assignee_id)
        .bind(data.reviewer_id)
        .bind(data.created_by)
        .fetch_one(pool)
        .await?;

        Ok(task)
    }

    /// Finds a task by ID.
    pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        let task = sqlx::query_as::<_, Task>(
            r#"
            SELECT id, board_id, title, description, status, priority, due_date,
                   assignee_id, reviewer_id, created_by, created_at, updated_at
            FROM tasks
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(pool)
        .await?;

        Ok(task)
    }

    /// Applies a partial update. The board reference is never touched.
    ///
    /// Returns the updated task, or `None` if it does not exist.
    pub async fn update(
        pool: &PgPool,
        id: Uuid,
        data: UpdateTask,
    ) -> Result<Option<Self>, sqlx::Error> {
        let task = sqlx::query_as::<_, Task>(
            r#"
            UPDATE tasks
            SET title = COALESCE($2, title),
                description = COALESCE($3, description),
                status = COALESCE($4, status),
                priority = COALESCE($5, priority),
                due_date = CASE WHEN $6 THEN $7 ELSE due_date END,
                assignee_id = CASE WHEN $8 THEN $9 ELSE assignee_id END,
                reviewer_id = CASE WHEN $10 THEN $11 ELSE reviewer_id END,
                updated_at = NOW()
            WHERE id = $1
            RETURNING id, board_id, title, description, status, priority, due_date,
                      assignee_id, reviewer_id, created_by, created_at, updated_at
            "#,
        )
        .bind(id)
        .bind(data.title)
        .bind(data.description)
        .bind(data.status)
        .bind(data.priority)
        .bind(data.due_date.is_some())
        .bind(data.due_date.flatten())
        .bind(data.assignee_id.is_some())
        .bind(data.assignee_id.flatten())
        .bind(data.reviewer_id.is_some())
        .bind(data.reviewer_id.flatten())
        .fetch_optional(pool)
        .await?;

        Ok(task)
    }

    /// Lists a board's tasks with comment counts, oldest first.
    pub async fn list_by_board(
        pool: &PgPool,
        board_id: Uuid,
    ) -> Result<Vec<TaskWithCommentCount>, sqlx::Error> {
        let tasks = sqlx::query_as::<_, TaskWithCommentCount>(
            r#"
            SELECT t.id, t.board_id, t.title, t.description, t.status, t.priority,
                   t.due_date, t.assignee_id, t.reviewer_id, t.created_by,
                   t.created_at, t.updated_at,
                   (SELECT COUNT(*) FROM comments c WHERE c.task_id = t.id) AS comments_count
            FROM tasks t
            WHERE t.board_id = $1
            ORDER BY t.created_at ASC
            "#,
        )
        .bind(board_id)
        .fetch_all(pool)
        .await?;

        Ok(tasks)
    }

    /// Lists tasks where the user is the assignee, newest first.
    pub async fn list_assigned_to(
        pool: &PgPool,
        user_id: Uuid,
    ) -> Result<Vec<TaskWithCommentCount>, sqlx::Error> {
        let tasks = sqlx::query_as::<_, TaskWithCommentCount>(
            r#"
            SELECT t.id, t.board_id, t.title, t.description, t.status, t.priority,
                   t.due_date, t.assignee_id, t.reviewer_id, t.created_by,
                   t.created_at, t.updated_at,
                   (SELECT COUNT(*) FROM comments c WHERE c.task_id = t.id) AS comments_count
            FROM tasks t
            WHERE t.assignee_id = $1
            ORDER BY t.created_at DESC
            "#,
        )
        .bind(user_id)
        .fetch_all(pool)
        .await?;

        Ok(tasks)
    }

    /// Lists tasks where the user is the reviewer, newest first.
    pub async fn list_reviewing(
        pool: &PgPool,
        user_id: Uuid,
    ) -> Result<Vec<TaskWithCommentCount>, sqlx::Error> {
        let tasks = sqlx::query_as::<_, TaskWithCommentCount>(
            r#"
            SELECT t.id, t.board_id, t.title, t.description, t.status, t.priority,
                   t.due_date, t.assignee_id, t.reviewer_id, t.created_by,
                   t.created_at, t.updated_at,
                   (SELECT COUNT(*) FROM comments c WHERE c.task_id = t.id) AS comments_count
            FROM tasks t
            WHERE t.reviewer_id = $1
            ORDER BY t.created_at DESC
            "#,
        )
        .bind(user_id)
        .fetch_all(pool)
        .await?;

        Ok(tasks)
    }

    /// Deletes a task. Comments cascade.
    pub async fn delete(pool: &PgPool, id: Uuid) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM tasks WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
