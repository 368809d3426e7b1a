/// Task endpoints
///
/// # Endpoints
///
/// - `POST /v1/boards/:board_id/columns/:column_id/tasks` - Create a task
/// - `GET /v1/boards/:board_id/tasks/:task_id` - Fetch a task
/// - `PUT /v1/boards/:board_id/tasks/:task_id` - Update title/description/assignee
/// - `DELETE /v1/boards/:board_id/tasks/:task_id` - Delete a task
/// - `PATCH /v1/boards/:board_id/tasks/:task_id/move` - Move between columns
///   and/or neighbors

use crate::{
    app::{AppState, CurrentUser},
    error::ApiResult,
    routes::auth::validation_errors,
};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    Extension, Json,
};
use serde::Deserialize;
use taskboard_shared::models::{CreateTask, Task, UpdateTask};
use taskboard_shared::ops::MoveTask;
use uuid::Uuid;
use validator::Validate;

/// Create task request
#[derive(Debug, Deserialize, Validate)]
pub struct CreateTaskRequest {
    #[validate(length(min = 1, max = 70, message = "Title must be 1-70 characters"))]
    pub title: String,

    #[validate(length(max = 200, message = "Description must be at most 200 characters"))]
    #[serde(default)]
    pub description: String,

    /// Optional assignee; must be a member of the board
    pub assignee_id: Option<Uuid>,
}

/// Update task request. `assignee_id` distinguishes "absent" (leave as is)
/// from `null` (unassign).
#[derive(Debug, Deserialize, Validate)]
pub struct UpdateTaskRequest {
    #[validate(length(min = 1, max = 70, message = "Title must be 1-70 characters"))]
    pub title: Option<String>,

    #[validate(length(max = 200, message = "Description must be at most 200 characters"))]
    pub description: Option<String>,

    #[serde(default, deserialize_with = "crate::routes::double_option")]
    pub assignee_id: Option<Option<Uuid>>,
}

/// `POST /v1/boards/:board_id/columns/:column_id/tasks`
///
/// # Errors
///
/// - `409 Conflict`: destination column is at its WIP limit
/// - `422 Unprocessable Entity`: validation failed or assignee is not a
///   board member
pub async fn create_task(
    State(state): State<AppState>,
    Extension(CurrentUser(user_id)): Extension<CurrentUser>,
    Path((board_id, column_id)): Path<(i64, i64)>,
    Json(req): Json<CreateTaskRequest>,
) -> ApiResult<(StatusCode, Json<Task>)> {
    req.validate().map_err(validation_errors)?;

    let task = state
        .ops
        .create_task(
            user_id,
            board_id,
            column_id,
            CreateTask {
                title: req.title,
                description: req.description,
                assignee_id: req.assignee_id,
            },
        )
        .await?;

    Ok((StatusCode::CREATED, Json(task)))
}

/// `GET /v1/boards/:board_id/tasks/:task_id`
pub async fn get_task(
    State(state): State<AppState>,
    Extension(CurrentUser(user_id)): Extension<CurrentUser>,
    Path((board_id, task_id)): Path<(i64, i64)>,
) -> ApiResult<Json<Task>> {
    let task = state.ops.get_task(user_id, board_id, task_id).await?;
    Ok(Json(task))
}

/// `PUT /v1/boards/:board_id/tasks/:task_id`
pub async fn update_task(
    State(state): State<AppState>,
    Extension(CurrentUser(user_id)): Extension<CurrentUser>,
    Path((board_id, task_id)): Path<(i64, i64)>,
    Json(req): Json<UpdateTaskRequest>,
) -> ApiResult<Json<Task>> {
    req.validate().map_err(validation_errors)?;

    let task = state
        .ops
        .update_task(
            user_id,
            board_id,
            task_id,
            UpdateTask {
                title: req.title,
                description: req.description,
                assignee_id: req.assignee_id,
            },
        )
        .await?;
    Ok(Json(task))
}

/// `DELETE /v1/boards/:board_id/tasks/:task_id`
pub async fn delete_task(
    State(state): State<AppState>,
    Extension(CurrentUser(user_id)): Extension<CurrentUser>,
    Path((board_id, task_id)): Path<(i64, i64)>,
) -> ApiResult<StatusCode> {
    state.ops.delete_task(user_id, board_id, task_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// `PATCH /v1/boards/:board_id/tasks/:task_id/move`
///
/// Moves the task to `to_column_id`, landing between `above_task_id` and
/// `below_task_id` (either may be omitted; with neither the task is appended).
/// Publishes a `task_moved` event to the board's live stream after commit.
///
/// # Errors
///
/// - `409 Conflict`: destination column is at its WIP limit
pub async fn move_task(
    State(state): State<AppState>,
    Extension(CurrentUser(user_id)): Extension<CurrentUser>,
    Path((board_id, task_id)): Path<(i64, i64)>,
    Json(req): Json<MoveTask>,
) -> ApiResult<Json<Task>> {
    let task = state.ops.move_task(user_id, board_id, task_id, req).await?;
    Ok(Json(task))
}
