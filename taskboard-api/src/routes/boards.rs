/// Board endpoints
///
/// # Endpoints
///
/// - `POST /v1/boards` - Create a board (caller becomes its administrator)
/// - `GET /v1/boards` - List boards the caller belongs to (paginated)
/// - `GET /v1/boards/:board_id` - Board with ordered columns
/// - `PUT /v1/boards/:board_id` - Update name/description (ADMIN)
/// - `DELETE /v1/boards/:board_id` - Delete board (ADMIN)

use crate::{
    app::{AppState, CurrentUser},
    error::ApiResult,
    routes::auth::validation_errors,
};
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Extension, Json,
};
use serde::Deserialize;
use taskboard_shared::models::{Board, CreateBoard, UpdateBoard};
use taskboard_shared::ops::BoardDetail;
use taskboard_shared::pagination::Pagination;
use validator::Validate;

/// Create board request
#[derive(Debug, Deserialize, Validate)]
pub struct CreateBoardRequest {
    #[validate(length(min = 1, max = 100, message = "Name must be 1-100 characters"))]
    pub name: String,

    #[validate(length(max = 500, message = "Description must be at most 500 characters"))]
    #[serde(default)]
    pub description: String,
}

/// Update board request
#[derive(Debug, Deserialize, Validate)]
pub struct UpdateBoardRequest {
    #[validate(length(min = 1, max = 100, message = "Name must be 1-100 characters"))]
    pub name: Option<String>,

    #[validate(length(max = 500, message = "Description must be at most 500 characters"))]
    pub description: Option<String>,
}

/// `POST /v1/boards`
pub async fn create_board(
    State(state): State<AppState>,
    Extension(CurrentUser(user_id)): Extension<CurrentUser>,
    Json(req): Json<CreateBoardRequest>,
) -> ApiResult<(StatusCode, Json<Board>)> {
    req.validate().map_err(validation_errors)?;

    let board = state
        .ops
        .create_board(
            user_id,
            CreateBoard {
                name: req.name,
                description: req.description,
            },
        )
        .await?;

    Ok((StatusCode::CREATED, Json(board)))
}

/// `GET /v1/boards?limit=&offset=`
pub async fn list_boards(
    State(state): State<AppState>,
    Extension(CurrentUser(user_id)): Extension<CurrentUser>,
    Query(page): Query<Pagination>,
) -> ApiResult<Json<Vec<Board>>> {
    let boards = state.ops.list_boards(user_id, page).await?;
    Ok(Json(boards))
}

/// `GET /v1/boards/:board_id`
pub async fn get_board(
    State(state): State<AppState>,
    Extension(CurrentUser(user_id)): Extension<CurrentUser>,
    Path(board_id): Path<i64>,
) -> ApiResult<Json<BoardDetail>> {
    let detail = state.ops.get_board(user_id, board_id).await?;
    Ok(Json(detail))
}

/// `PUT /v1/boards/:board_id`
pub async fn update_board(
    State(state): State<AppState>,
    Extension(CurrentUser(user_id)): Extension<CurrentUser>,
    Path(board_id): Path<i64>,
    Json(req): Json<UpdateBoardRequest>,
) -> ApiResult<Json<Board>> {
    req.validate().map_err(validation_errors)?;

    let board = state
        .ops
        .update_board(
            user_id,
            board_id,
            UpdateBoard {
                name: req.name,
                description: req.description,
            },
        )
        .await?;
    Ok(Json(board))
}

/// `DELETE /v1/boards/:board_id`
pub async fn delete_board(
    State(state): State<AppState>,
    Extension(CurrentUser(user_id)): Extension<CurrentUser>,
    Path(board_id): Path<i64>,
) -> ApiResult<StatusCode> {
    state.ops.delete_board(user_id, board_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
