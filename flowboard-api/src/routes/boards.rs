//! Board endpoints
//!
//! # Endpoints
//!
//! - `GET    /api/boards` - boards the current user owns or belongs to
//! - `POST   /api/boards` - create a board
//! - `GET    /api/boards/:id` - board detail with members and tasks
//! - `PATCH  /api/boards/:id` - rename / replace member list (owner only)
//! - `DELETE /api/boards/:id` - delete (owner only)

use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
    routes::{load_board, load_board_scope, tasks::TaskResponse, validation_error},
};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    Extension, Json,
};
use flowboard_shared::{
    auth::{
        authorization::{require, Action},
        middleware::CurrentUser,
    },
    models::{
        board::{Board, BoardSummary, CreateBoard},
        membership::Membership,
        task::Task,
        user::{User, UserSummary},
    },
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

/// Create board request.
#[derive(Debug, Deserialize, Validate)]
pub struct CreateBoardRequest {
    /// Board title
    #[validate(length(min = 1, max = 255, message = "Title must be 1-255 characters"))]
    pub title: String,

    /// Initial member user IDs
    #[serde(default)]
    pub members: Vec<Uuid>,
}

/// Update board request. Absent fields are left unchanged.
#[derive(Debug, Deserialize, Validate)]
pub struct UpdateBoardRequest {
    /// New title
    #[validate(length(min = 1, max = 255, message = "Title must be 1-255 characters"))]
    pub title: Option<String>,

    /// Replacement member list (the owner always stays a member)
    pub members: Option<Vec<Uuid>>,
}

/// Board detail response: the board plus resolved members and tasks.
#[derive(Debug, Serialize)]
pub struct BoardDetailResponse {
    /// Board ID
    pub id: Uuid,

    /// Board title
    pub title: String,

    /// Owner user ID
    pub owner_id: Uuid,

    /// Member summaries, owner included
    pub members: Vec<UserSummary>,

    /// Tasks on the board
    pub tasks: Vec<TaskResponse>,
}

/// Board response after a mutation: the board plus resolved members.
#[derive(Debug, Serialize)]
pub struct BoardResponse {
    /// Board ID
    pub id: Uuid,

    /// Board title
    pub title: String,

    /// Owner user ID
    pub owner_id: Uuid,

    /// Member summaries
    pub members: Vec<UserSummary>,
}

async fn member_summaries(state: &AppState, board_id: Uuid) -> ApiResult<Vec<UserSummary>> {
    let member_ids = Membership::member_ids(&state.db, board_id).await?;
    Ok(User::summaries_by_ids(&state.db, &member_ids).await?)
}

/// Verifies that every proposed member ID refers to an existing user.
async fn check_member_ids(state: &AppState, ids: &[Uuid]) -> ApiResult<()> {
    let missing = User::missing_ids(&state.db, ids).await?;
    if !missing.is_empty() {
        return Err(ApiError::BadRequest(format!(
            "Unknown user ids: {}",
            missing
                .iter()
                .map(|id| id.to_string())
                .collect::<Vec<_>>()
                .join(", ")
        )));
    }
    Ok(())
}

/// Lists the current user's boards with aggregate counts.
pub async fn list_boards(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
) -> ApiResult<Json<Vec<BoardSummary>>> {
    let summaries = Board::summaries_for_user(&state.db, user.user_id).await?;
    Ok(Json(summaries))
}

/// Creates a board owned by the current user.
///
/// The creator becomes owner and first member; the listed users join as
/// members. No authorization check: any authenticated user may create a
/// board of their own.
///
/// # Errors
///
/// - `400 Bad Request`: a member ID does not refer to an existing user
pub async fn create_board(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Json(req): Json<CreateBoardRequest>,
) -> ApiResult<(StatusCode, Json<BoardResponse>)> {
    req.validate().map_err(validation_error)?;
    check_member_ids(&state, &req.members).await?;

    let board = Board::create(
        &state.db,
        user.user_id,
        CreateBoard {
            title: req.title,
            members: req.members,
        },
    )
    .await?;

    let members = member_summaries(&state, board.id).await?;

    Ok((
        StatusCode::CREATED,
        Json(BoardResponse {
            id: board.id,
            title: board.title,
            owner_id: board.owner_id,
            members,
        }),
    ))
}

/// Returns a board with its members and tasks. Members only.
pub async fn board_detail(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<BoardDetailResponse>> {
    let board = load_board(&state.db, id).await?;
    let scope = load_board_scope(&state.db, &board).await?;

    require(user.user_id, Action::ReadBoard(&scope))?;

    let members = member_summaries(&state, board.id).await?;
    let tasks = Task::list_by_board(&state.db, board.id).await?;
    let tasks = super::tasks::task_responses(&state, tasks).await?;

    Ok(Json(BoardDetailResponse {
        id: board.id,
        title: board.title,
        owner_id: board.owner_id,
        members,
        tasks,
    }))
}

/// Renames a board and/or replaces its member list. Owner only.
///
/// A replacement member list never evicts the owner; the board keeps at
/// least one member.
pub async fn update_board(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<Uuid>,
    Json(req): Json<UpdateBoardRequest>,
) -> ApiResult<Json<BoardResponse>> {
    req.validate().map_err(validation_error)?;

    let board = load_board(&state.db, id).await?;
    let scope = load_board_scope(&state.db, &board).await?;

    require(user.user_id, Action::ModifyBoard(&scope))?;

    if let Some(member_ids) = &req.members {
        check_member_ids(&state, member_ids).await?;
        Membership::replace(&state.db, board.id, board.owner_id, member_ids).await?;
    }

    let board = match req.title {
        Some(title) => Board::rename(&state.db, board.id, &title)
            .await?
            .ok_or_else(|| ApiError::NotFound("Board not found".to_string()))?,
        None => board,
    };

    let members = member_summaries(&state, board.id).await?;

    Ok(Json(BoardResponse {
        id: board.id,
        title: board.title,
        owner_id: board.owner_id,
        members,
    }))
}

/// Deletes a board with everything on it. Owner only.
pub async fn delete_board(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<Uuid>,
) -> ApiResult<StatusCode> {
    let board = load_board(&state.db, id).await?;
    let scope = load_board_scope(&state.db, &board).await?;

    require(user.user_id, Action::DeleteBoard(&scope))?;

    Board::delete(&state.db, board.id).await?;

    Ok(StatusCode::NO_CONTENT)
}
