/// Per-board authorization gate
///
/// Every board operation passes through [`require_board_role`] before it
/// reads or writes anything: the caller must be a member of the board and
/// hold one of the roles the operation accepts. Viewers read, members edit
/// content, admins additionally manage the board and its membership.
///
/// A caller who is not a member of an existing board gets
/// `PermissionDenied`; a board that does not exist at all surfaces as
/// `BoardNotFound` so handlers return 404 rather than 403.

use crate::error::{DomainError, DomainResult};
use crate::models::{Board, BoardRole, Membership};
use sqlx::PgConnection;

/// Roles allowed to read board content
pub const ANY_ROLE: &[BoardRole] = &[BoardRole::Admin, BoardRole::Member, BoardRole::Viewer];

/// Roles allowed to create, edit, and move content
pub const CONTENT_EDITORS: &[BoardRole] = &[BoardRole::Admin, BoardRole::Member];

/// Roles allowed to manage the board itself and its membership
pub const ADMIN_ONLY: &[BoardRole] = &[BoardRole::Admin];

/// Pure authorization decision, separated from the lookups for testability
fn authorize(
    board_id: i64,
    role: Option<BoardRole>,
    board_exists: bool,
    allowed: &[BoardRole],
) -> DomainResult<BoardRole> {
    match role {
        Some(role) if allowed.contains(&role) => Ok(role),
        Some(_) => Err(DomainError::PermissionDenied),
        None if board_exists => Err(DomainError::PermissionDenied),
        None => Err(DomainError::BoardNotFound(board_id)),
    }
}

/// Requires `user_id` to hold one of `allowed` on `board_id`.
///
/// Returns the caller's role so operations that branch on it (for example
/// membership checks that need the acting role) do not look it up twice.
///
/// # Errors
///
/// - `BoardNotFound` if the board does not exist
/// - `PermissionDenied` if the caller is not a member or holds a role
///   outside `allowed`
pub async fn require_board_role(
    conn: &mut PgConnection,
    board_id: i64,
    user_id: uuid::Uuid,
    allowed: &[BoardRole],
) -> DomainResult<BoardRole> {
    let role = Membership::get_role(&mut *conn, board_id, user_id).await?;

    // Only hit the boards table when membership alone cannot decide.
    let board_exists = match role {
        Some(_) => true,
        None => Board::find(&mut *conn, board_id).await?.is_some(),
    };

    authorize(board_id, role, board_exists, allowed)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_allowed_role_passes() {
        let role = authorize(1, Some(BoardRole::Member), true, CONTENT_EDITORS);
        assert_eq!(role.unwrap(), BoardRole::Member);
    }

    #[test]
    fn test_insufficient_role_is_denied() {
        let result = authorize(1, Some(BoardRole::Viewer), true, CONTENT_EDITORS);
        assert!(matches!(result, Err(DomainError::PermissionDenied)));

        let result = authorize(1, Some(BoardRole::Member), true, ADMIN_ONLY);
        assert!(matches!(result, Err(DomainError::PermissionDenied)));
    }

    #[test]
    fn test_non_member_of_existing_board_is_denied() {
        let result = authorize(1, None, true, ANY_ROLE);
        assert!(matches!(result, Err(DomainError::PermissionDenied)));
    }

    #[test]
    fn test_missing_board_is_not_found() {
        let result = authorize(42, None, false, ANY_ROLE);
        assert!(matches!(result, Err(DomainError::BoardNotFound(42))));
    }

    #[test]
    fn test_viewer_can_read() {
        let role = authorize(1, Some(BoardRole::Viewer), true, ANY_ROLE);
        assert_eq!(role.unwrap(), BoardRole::Viewer);
    }
}
