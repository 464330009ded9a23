//! Task endpoints
//!
//! # Endpoints
//!
//! - `POST   /api/tasks` - create a task on a board (members only)
//! - `GET    /api/tasks/assigned-to-me` - tasks assigned to the current user
//! - `GET    /api/tasks/reviewing` - tasks the current user reviews
//! - `PATCH  /api/tasks/:id` - update a task (members only)
//! - `DELETE /api/tasks/:id` - delete (task creator or board owner)
//!
//! A task's board is fixed at creation. A `board_id` in an update payload is
//! routed through the evaluator's move-task rule, which denies it
//! categorically, so the field can never take effect for anyone.

use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
    routes::{load_board, load_board_scope, load_task, validation_error},
};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    Extension, Json,
};
use chrono::NaiveDate;
use flowboard_shared::{
    auth::{
        authorization::{require, Action, BoardScope, TaskScope},
        middleware::CurrentUser,
    },
    models::{
        comment::Comment,
        task::{CreateTask, Task, TaskPriority, TaskStatus, TaskWithCommentCount, UpdateTask},
        user::{User, UserSummary},
    },
};
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::HashMap;
use uuid::Uuid;
use validator::Validate;

/// Create task request.
#[derive(Debug, Deserialize, Validate)]
pub struct CreateTaskRequest {
    /// Board to create the task on
    pub board_id: Uuid,

    /// Task title
    #[validate(length(min = 1, max = 255, message = "Title must be 1-255 characters"))]
    pub title: String,

    /// Description
    #[serde(default)]
    pub description: String,

    /// Initial status (defaults to to-do)
    pub status: Option<TaskStatus>,

    /// Priority (defaults to medium)
    pub priority: Option<TaskPriority>,

    /// Optional due date
    pub due_date: Option<NaiveDate>,

    /// Optional assignee (must be a board member)
    pub assignee_id: Option<Uuid>,

    /// Optional reviewer (must be a board member)
    pub reviewer_id: Option<Uuid>,
}

/// Update task request.
///
/// Absent fields are left unchanged. For the nullable fields an explicit
/// JSON `null` clears the value, distinguished from absence by a
/// presence-preserving deserializer.
#[derive(Debug, Default, Deserialize, Validate)]
pub struct UpdateTaskRequest {
    /// Attempted board reassignment; always refused
    pub board_id: Option<Uuid>,

    /// New title
    #[validate(length(min = 1, max = 255, message = "Title must be 1-255 characters"))]
    pub title: Option<String>,

    /// New description
    pub description: Option<String>,

    /// New status
    pub status: Option<TaskStatus>,

    /// New priority
    pub priority: Option<TaskPriority>,

    /// New due date; `null` clears it
    #[serde(default, deserialize_with = "double_option")]
    pub due_date: Option<Option<NaiveDate>>,

    /// New assignee; `null` unassigns
    #[serde(default, deserialize_with = "double_option")]
    pub assignee_id: Option<Option<Uuid>>,

    /// New reviewer; `null` clears it
    #[serde(default, deserialize_with = "double_option")]
    pub reviewer_id: Option<Option<Uuid>>,
}

/// Deserializes a present-but-null field as `Some(None)`.
///
/// Combined with `#[serde(default)]`, this keeps the outer `Option` as
/// "was the field present" and the inner one as the actual value.
fn double_option<'de, T, D>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    T: serde::Deserialize<'de>,
    D: Deserializer<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

/// Task response with resolved assignee/reviewer summaries.
#[derive(Debug, Serialize)]
pub struct TaskResponse {
    /// Task ID
    pub id: Uuid,

    /// Board the task lives on
    pub board: Uuid,

    /// Task title
    pub title: String,

    /// Description
    pub description: String,

    /// Current column
    pub status: TaskStatus,

    /// Priority
    pub priority: TaskPriority,

    /// Assignee, if any
    pub assignee: Option<UserSummary>,

    /// Reviewer, if any
    pub reviewer: Option<UserSummary>,

    /// Due date, if any
    pub due_date: Option<NaiveDate>,

    /// Number of comments on the task
    pub comments_count: i64,
}

/// Resolves assignee/reviewer summaries for a batch of tasks in one query.
pub(crate) async fn task_responses(
    state: &AppState,
    tasks: Vec<TaskWithCommentCount>,
) -> ApiResult<Vec<TaskResponse>> {
    let mut user_ids: Vec<Uuid> = tasks
        .iter()
        .flat_map(|t| [t.task.assignee_id, t.task.reviewer_id])
        .flatten()
        .collect();
    user_ids.sort_unstable();
    user_ids.dedup();

    let summaries: HashMap<Uuid, UserSummary> = User::summaries_by_ids(&state.db, &user_ids)
        .await?
        .into_iter()
        .map(|s| (s.id, s))
        .collect();

    Ok(tasks
        .into_iter()
        .map(|t| {
            let assignee = t.task.assignee_id.and_then(|id| summaries.get(&id).cloned());
            let reviewer = t.task.reviewer_id.and_then(|id| summaries.get(&id).cloned());
            TaskResponse {
                id: t.task.id,
                board: t.task.board_id,
                title: t.task.title,
                description: t.task.description,
                status: t.task.status,
                priority: t.task.priority,
                assignee,
                reviewer,
                due_date: t.task.due_date,
                comments_count: t.comments_count,
            }
        })
        .collect())
}

async fn single_task_response(state: &AppState, task: Task) -> ApiResult<TaskResponse> {
    let comments_count = Comment::count_by_task(&state.db, task.id).await?;

    let mut responses =
        task_responses(state, vec![TaskWithCommentCount { task, comments_count }]).await?;

    // One in, one out.
    Ok(responses.remove(0))
}

/// Creates a task on a board. Members only; assignee and reviewer must be
/// members too.
///
/// # Errors
///
/// - `403 Forbidden`: not a board member, or a designated user is not
/// - `404 Not Found`: board does not exist
pub async fn create_task(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Json(req): Json<CreateTaskRequest>,
) -> ApiResult<(StatusCode, Json<TaskResponse>)> {
    req.validate().map_err(validation_error)?;

    let board = load_board(&state.db, req.board_id).await?;
    let scope = load_board_scope(&state.db, &board).await?;

    require(user.user_id, Action::CreateTask(&scope))?;

    // Validate designees against the prospective task's board.
    let prospective = TaskScope {
        board: scope.clone(),
        created_by: Some(user.user_id),
    };
    for designated in [req.assignee_id, req.reviewer_id].into_iter().flatten() {
        require(
            user.user_id,
            Action::AssignTask {
                task: &prospective,
                user_id: designated,
            },
        )?;
    }

    let task = Task::create(
        &state.db,
        CreateTask {
            board_id: board.id,
            title: req.title,
            description: req.description,
            status: req.status.unwrap_or(TaskStatus::Todo),
            priority: req.priority.unwrap_or(TaskPriority::Medium),
            due_date: req.due_date,
            assignee_id: req.assignee_id,
            reviewer_id: req.reviewer_id,
            created_by: Some(user.user_id),
        },
    )
    .await?;

    let response = single_task_response(&state, task).await?;
    Ok((StatusCode::CREATED, Json(response)))
}

/// Lists tasks assigned to the current user across all boards.
pub async fn assigned_to_me(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
) -> ApiResult<Json<Vec<TaskResponse>>> {
    let tasks = Task::list_assigned_to(&state.db, user.user_id).await?;
    Ok(Json(task_responses(&state, tasks).await?))
}

/// Lists tasks the current user reviews across all boards.
pub async fn reviewing(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
) -> ApiResult<Json<Vec<TaskResponse>>> {
    let tasks = Task::list_reviewing(&state.db, user.user_id).await?;
    Ok(Json(task_responses(&state, tasks).await?))
}

/// Updates a task. Members only.
///
/// Changing the board is refused for everyone; changing assignee or
/// reviewer re-validates membership at decision time.
pub async fn update_task(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<Uuid>,
    Json(req): Json<UpdateTaskRequest>,
) -> ApiResult<Json<TaskResponse>> {
    req.validate().map_err(validation_error)?;

    let (task, _board, scope) = load_task(&state.db, id).await?;
    let task_scope = TaskScope {
        board: scope.clone(),
        created_by: task.created_by,
    };

    require(user.user_id, Action::UpdateTask(&task_scope))?;

    // Board reassignment is refused outright, even to the same board. The
    // persistence layer has no way to move a task either; this check exists
    // to turn the attempt into an explicit 403 instead of a silent no-op.
    if let Some(destination_id) = req.board_id {
        let destination = load_board(&state.db, destination_id).await?;
        let destination_scope = BoardScope::unresolved(destination.owner_id);
        require(
            user.user_id,
            Action::MoveTask {
                task: &task_scope,
                destination: &destination_scope,
            },
        )?;
    }

    for designated in [&req.assignee_id, &req.reviewer_id] {
        if let Some(Some(designated)) = designated {
            require(
                user.user_id,
                Action::AssignTask {
                    task: &task_scope,
                    user_id: *designated,
                },
            )?;
        }
    }

    let updated = Task::update(
        &state.db,
        task.id,
        UpdateTask {
            title: req.title,
            description: req.description,
            status: req.status,
            priority: req.priority,
            due_date: req.due_date,
            assignee_id: req.assignee_id,
            reviewer_id: req.reviewer_id,
        },
    )
    .await?
    .ok_or_else(|| ApiError::NotFound("Task not found".to_string()))?;

    Ok(Json(single_task_response(&state, updated).await?))
}

/// Deletes a task. Task creator or board owner only.
pub async fn delete_task(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<Uuid>,
) -> ApiResult<StatusCode> {
    let (task, _board, scope) = load_task(&state.db, id).await?;
    let task_scope = TaskScope {
        board: scope,
        created_by: task.created_by,
    };

    require(user.user_id, Action::DeleteTask(&task_scope))?;

    Task::delete(&state.db, task.id).await?;

    Ok(StatusCode::NO_CONTENT)
}
