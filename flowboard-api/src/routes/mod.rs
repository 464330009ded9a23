//! API route handlers
//!
//! Organized by resource:
//!
//! - `health`: Health check endpoint
//! - `auth`: Registration, login, token refresh, email lookup
//! - `boards`: Board CRUD and membership management
//! - `tasks`: Task CRUD, assignment, personal task lists
//! - `comments`: Comment threads on tasks
//!
//! Every handler receives the acting user from the request extensions (put
//! there by the Bearer-auth layer) and passes it explicitly into the
//! authorization evaluator next to a resolved snapshot of the target
//! resource. Handlers never consult ambient state for identity, and they
//! resolve the member list before asking for a decision, so the evaluator's
//! fail-closed path is a backstop rather than a code path in normal use.

use crate::error::{ApiError, ApiResult, ValidationErrorDetail};
use flowboard_shared::auth::authorization::BoardScope;
use flowboard_shared::models::{board::Board, membership::Membership, task::Task};
use sqlx::PgPool;
use uuid::Uuid;
use validator::ValidationErrors;

pub mod auth;
pub mod boards;
pub mod comments;
pub mod health;
pub mod tasks;

/// Maps `validator` errors onto the API's 422 response shape.
pub(crate) fn validation_error(errors: ValidationErrors) -> ApiError {
    let details: Vec<ValidationErrorDetail> = errors
        .field_errors()
        .iter()
        .flat_map(|(field, errors)| {
            errors.iter().map(move |error| ValidationErrorDetail {
                field: field.to_string(),
                message: error
                    .message
                    .as_ref()
                    .map(|m| m.to_string())
                    .unwrap_or_else(|| "Validation failed".to_string()),
            })
        })
        .collect();

    ApiError::ValidationError(details)
}

/// Loads a board or fails with 404.
pub(crate) async fn load_board(db: &PgPool, id: Uuid) -> ApiResult<Board> {
    Board::find_by_id(db, id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Board not found".to_string()))
}

/// Resolves a board's authorization scope: owner plus the full member list.
pub(crate) async fn load_board_scope(db: &PgPool, board: &Board) -> ApiResult<BoardScope> {
    let member_ids = Membership::member_ids(db, board.id).await?;
    Ok(BoardScope::resolved(board.owner_id, member_ids))
}

/// Loads a task together with its board and the board's resolved scope, or
/// fails with 404.
pub(crate) async fn load_task(db: &PgPool, id: Uuid) -> ApiResult<(Task, Board, BoardScope)> {
    let task = Task::find_by_id(db, id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Task not found".to_string()))?;

    let board = load_board(db, task.board_id).await?;
    let scope = load_board_scope(db, &board).await?;

    Ok((task, board, scope))
}
