/// Membership endpoints
///
/// Members are addressed by email; mutations are ADMIN-gated and guarded by
/// the membership invariants in the shared crate.
///
/// # Endpoints
///
/// - `GET /v1/boards/:board_id/members` - List members
/// - `POST /v1/boards/:board_id/members` - Add member by email
/// - `PUT /v1/boards/:board_id/members` - Change a member's role by email
/// - `DELETE /v1/boards/:board_id/members` - Remove member by email

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
use taskboard_shared::models::{BoardRole, Membership};
use validator::Validate;

/// Add / update member request
#[derive(Debug, Deserialize, Validate)]
pub struct MemberRequest {
    #[validate(email(message = "Invalid email format"))]
    pub email: String,

    pub role: BoardRole,
}

/// Remove member request
#[derive(Debug, Deserialize, Validate)]
pub struct RemoveMemberRequest {
    #[validate(email(message = "Invalid email format"))]
    pub email: String,
}

/// `GET /v1/boards/:board_id/members`
pub async fn list_members(
    State(state): State<AppState>,
    Extension(CurrentUser(user_id)): Extension<CurrentUser>,
    Path(board_id): Path<i64>,
) -> ApiResult<Json<Vec<Membership>>> {
    let members = state.ops.list_members(user_id, board_id).await?;
    Ok(Json(members))
}

/// `POST /v1/boards/:board_id/members`
///
/// # Errors
///
/// - `404 Not Found`: no user with that email
/// - `409 Conflict`: already a member, or the requested role is `admin`
pub async fn add_member(
    State(state): State<AppState>,
    Extension(CurrentUser(user_id)): Extension<CurrentUser>,
    Path(board_id): Path<i64>,
    Json(req): Json<MemberRequest>,
) -> ApiResult<(StatusCode, Json<Membership>)> {
    req.validate().map_err(validation_errors)?;

    let member = state
        .ops
        .add_member(user_id, board_id, req.email, req.role)
        .await?;
    Ok((StatusCode::CREATED, Json(member)))
}

/// `PUT /v1/boards/:board_id/members`
///
/// # Errors
///
/// - `403 Forbidden`: self-demotion
/// - `409 Conflict`: would add a second admin or demote the only one
pub async fn update_member(
    State(state): State<AppState>,
    Extension(CurrentUser(user_id)): Extension<CurrentUser>,
    Path(board_id): Path<i64>,
    Json(req): Json<MemberRequest>,
) -> ApiResult<Json<Membership>> {
    req.validate().map_err(validation_errors)?;

    let member = state
        .ops
        .update_member(user_id, board_id, req.email, req.role)
        .await?;
    Ok(Json(member))
}

/// `DELETE /v1/boards/:board_id/members`
///
/// # Errors
///
/// - `403 Forbidden`: self-removal
/// - `409 Conflict`: target is the board's only admin
pub async fn remove_member(
    State(state): State<AppState>,
    Extension(CurrentUser(user_id)): Extension<CurrentUser>,
    Path(board_id): Path<i64>,
    Json(req): Json<RemoveMemberRequest>,
) -> ApiResult<StatusCode> {
    req.validate().map_err(validation_errors)?;

    state.ops.remove_member(user_id, board_id, req.email).await?;
    Ok(StatusCode::NO_CONTENT)
}
