/// Column endpoints
///
/// # Endpoints
///
/// - `POST /v1/boards/:board_id/columns` - Add a column
/// - `GET /v1/boards/:board_id/columns/:column_id` - Column with ordered tasks
/// - `PUT /v1/boards/:board_id/columns/:column_id` - Update name/WIP limit
/// - `DELETE /v1/boards/:board_id/columns/:column_id` - Delete column

use crate::{
    app::{AppState, CurrentUser},
    error::{ApiError, ApiResult},
    routes::auth::validation_errors,
};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    Extension, Json,
};
use rust_decimal::Decimal;
use serde::Deserialize;
use taskboard_shared::models::{Column, CreateColumn, UpdateColumn};
use taskboard_shared::ops::ColumnDetail;
use validator::Validate;

/// Create column request
#[derive(Debug, Deserialize, Validate)]
pub struct CreateColumnRequest {
    #[validate(length(min = 1, max = 100, message = "Name must be 1-100 characters"))]
    pub name: String,

    /// Explicit ordering key; appended to the end when omitted
    pub position: Option<Decimal>,

    /// Maximum number of tasks; null means unlimited
    pub wip_limit: Option<i32>,
}

/// Update column request. `wip_limit` distinguishes "absent" (leave as is)
/// from `null` (clear the limit).
#[derive(Debug, Deserialize, Validate)]
pub struct UpdateColumnRequest {
    #[validate(length(min = 1, max = 100, message = "Name must be 1-100 characters"))]
    pub name: Option<String>,

    #[serde(default, deserialize_with = "crate::routes::double_option")]
    pub wip_limit: Option<Option<i32>>,
}

fn check_wip_limit(limit: Option<i32>) -> ApiResult<()> {
    if let Some(limit) = limit {
        if limit < 1 {
            return Err(ApiError::ValidationError(vec![
                crate::error::ValidationErrorDetail {
                    field: "wip_limit".to_string(),
                    message: "WIP limit must be at least 1".to_string(),
                },
            ]));
        }
    }
    Ok(())
}

/// `POST /v1/boards/:board_id/columns`
pub async fn create_column(
    State(state): State<AppState>,
    Extension(CurrentUser(user_id)): Extension<CurrentUser>,
    Path(board_id): Path<i64>,
    Json(req): Json<CreateColumnRequest>,
) -> ApiResult<(StatusCode, Json<Column>)> {
    req.validate().map_err(validation_errors)?;
    check_wip_limit(req.wip_limit)?;

    let column = state
        .ops
        .create_column(
            user_id,
            board_id,
            CreateColumn {
                name: req.name,
                position: req.position,
                wip_limit: req.wip_limit,
            },
        )
        .await?;

    Ok((StatusCode::CREATED, Json(column)))
}

/// `GET /v1/boards/:board_id/columns/:column_id`
pub async fn get_column(
    State(state): State<AppState>,
    Extension(CurrentUser(user_id)): Extension<CurrentUser>,
    Path((board_id, column_id)): Path<(i64, i64)>,
) -> ApiResult<Json<ColumnDetail>> {
    let detail = state.ops.get_column(user_id, board_id, column_id).await?;
    Ok(Json(detail))
}

/// `PUT /v1/boards/:board_id/columns/:column_id`
pub async fn update_column(
    State(state): State<AppState>,
    Extension(CurrentUser(user_id)): Extension<CurrentUser>,
    Path((board_id, column_id)): Path<(i64, i64)>,
    Json(req): Json<UpdateColumnRequest>,
) -> ApiResult<Json<Column>> {
    req.validate().map_err(validation_errors)?;
    if let Some(limit) = req.wip_limit {
        check_wip_limit(limit)?;
    }

    let column = state
        .ops
        .update_column(
            user_id,
            board_id,
            column_id,
            UpdateColumn {
                name: req.name,
                wip_limit: req.wip_limit,
            },
        )
        .await?;
    Ok(Json(column))
}

/// `DELETE /v1/boards/:board_id/columns/:column_id`
pub async fn delete_column(
    State(state): State<AppState>,
    Extension(CurrentUser(user_id)): Extension<CurrentUser>,
    Path((board_id, column_id)): Path<(i64, i64)>,
) -> ApiResult<StatusCode> {
    state.ops.delete_column(user_id, board_id, column_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
