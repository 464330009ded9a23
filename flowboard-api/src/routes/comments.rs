//! Comment endpoints
//!
//! # Endpoints
//!
//! - `GET    /api/tasks/:id/comments` - list a task's comments (members)
//! - `POST   /api/tasks/:id/comments` - comment on a task (members)
//! - `DELETE /api/tasks/:id/comments/:comment_id` - delete (author only)

use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
    routes::{load_task, validation_error},
};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    Extension, Json,
};
use chrono::{DateTime, Utc};
use flowboard_shared::{
    auth::{
        authorization::{require, Action, CommentScope, TaskScope},
        middleware::CurrentUser,
    },
    models::{
        comment::{Comment, CreateComment},
        user::User,
    },
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

/// Create comment request.
#[derive(Debug, Deserialize, Validate)]
pub struct CreateCommentRequest {
    /// Comment text
    #[validate(length(min = 1, message = "Comment must not be empty"))]
    pub content: String,
}

/// Comment response with the author's display name.
#[derive(Debug, Serialize)]
pub struct CommentResponse {
    /// Comment ID
    pub id: Uuid,

    /// When the comment was written
    pub created_at: DateTime<Utc>,

    /// Author's full name
    pub author: String,

    /// Comment text
    pub content: String,
}

/// Lists a task's comments, oldest first. Board members only.
pub async fn list_comments(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Path(task_id): Path<Uuid>,
) -> ApiResult<Json<Vec<CommentResponse>>> {
    let (task, _board, scope) = load_task(&state.db, task_id).await?;
    let task_scope = TaskScope {
        board: scope,
        created_by: task.created_by,
    };

    require(user.user_id, Action::ReadTask(&task_scope))?;

    let comments = Comment::list_by_task(&state.db, task.id).await?;

    Ok(Json(
        comments
            .into_iter()
            .map(|c| CommentResponse {
                id: c.comment.id,
                created_at: c.comment.created_at,
                author: c.author,
                content: c.comment.content,
            })
            .collect(),
    ))
}

/// Comments on a task. Board members only.
pub async fn create_comment(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Path(task_id): Path<Uuid>,
    Json(req): Json<CreateCommentRequest>,
) -> ApiResult<(StatusCode, Json<CommentResponse>)> {
    req.validate().map_err(validation_error)?;

    let (task, _board, scope) = load_task(&state.db, task_id).await?;
    let task_scope = TaskScope {
        board: scope,
        created_by: task.created_by,
    };

    require(user.user_id, Action::CreateComment(&task_scope))?;

    let comment = Comment::create(
        &state.db,
        CreateComment {
            task_id: task.id,
            author_id: user.user_id,
            content: req.content,
        },
    )
    .await?;

    // The author is the authenticated user; their account exists.
    let author = User::find_by_id(&state.db, user.user_id)
        .await?
        .map(|u| u.name)
        .ok_or_else(|| ApiError::InternalError("Comment author not found".to_string()))?;

    Ok((
        StatusCode::CREATED,
        Json(CommentResponse {
            id: comment.id,
            created_at: comment.created_at,
            author,
            content: comment.content,
        }),
    ))
}

/// Deletes a comment. Author only, board ownership notwithstanding.
pub async fn delete_comment(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Path((task_id, comment_id)): Path<(Uuid, Uuid)>,
) -> ApiResult<StatusCode> {
    let (task, _board, scope) = load_task(&state.db, task_id).await?;

    let comment = Comment::find_by_id(&state.db, comment_id)
        .await?
        .filter(|c| c.task_id == task.id)
        .ok_or_else(|| ApiError::NotFound("Comment not found".to_string()))?;

    let comment_scope = CommentScope {
        author_id: comment.author_id,
        board: scope,
    };

    require(user.user_id, Action::DeleteComment(&comment_scope))?;

    Comment::delete(&state.db, comment.id).await?;

    Ok(StatusCode::NO_CONTENT)
}
