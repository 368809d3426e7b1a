/// Board membership invariants
///
/// Every membership-mutating operation evaluates one of these checks inside
/// its unit of work, against state read in that same unit of work, before the
/// mutation is allowed to commit. The net invariant: a board's administrator
/// set never becomes empty, and a user can never unilaterally strip their own
/// administrator protection or remove themselves from a board they administer
/// alone.
///
/// The checks are pure functions over the already-read state, so the whole
/// decision table is unit-testable without a database.

use crate::error::DomainError;
use crate::models::membership::{BoardRole, Membership};
use uuid::Uuid;

/// Checks adding a new member to a board.
///
/// `existing` is the current membership for the (board, user) pair, if any.
///
/// # Errors
///
/// - `MemberAlreadyExists` when the pair already has a membership
/// - `SecondAdminNotAllowed` when the requested role is ADMIN; board creation
///   is the only path that establishes the administrator
pub fn check_add_member(
    existing: Option<&Membership>,
    requested: BoardRole,
) -> Result<(), DomainError> {
    if existing.is_some() {
        return Err(DomainError::MemberAlreadyExists);
    }
    if requested == BoardRole::Admin {
        return Err(DomainError::SecondAdminNotAllowed);
    }
    Ok(())
}

/// Checks changing an existing member's role.
///
/// `admin_count` is the board's current number of ADMIN memberships, read in
/// the same unit of work.
///
/// # Errors
///
/// - `MemberNotFound` when the target has no membership
/// - `SelfDemotionForbidden` when the acting user targets themselves with a
///   non-ADMIN role
/// - `SecondAdminNotAllowed` when the update would introduce an ADMIN where
///   the previous role was not ADMIN, or would remove the board's only ADMIN
pub fn check_update_member(
    board_id: i64,
    acting_user: Uuid,
    target_user: Uuid,
    existing: Option<&Membership>,
    requested: BoardRole,
    admin_count: i64,
) -> Result<(), DomainError> {
    let Some(current) = existing else {
        return Err(DomainError::MemberNotFound {
            board_id,
            user_id: target_user,
        });
    };
    if acting_user == target_user && requested != BoardRole::Admin {
        return Err(DomainError::SelfDemotionForbidden);
    }
    if requested == BoardRole::Admin && current.role != BoardRole::Admin {
        return Err(DomainError::SecondAdminNotAllowed);
    }
    if current.role == BoardRole::Admin && requested != BoardRole::Admin && admin_count <= 1 {
        return Err(DomainError::SecondAdminNotAllowed);
    }
    Ok(())
}

/// Checks removing a member from a board.
///
/// # Errors
///
/// - `MemberNotFound` when the target has no membership
/// - `SelfRemovalForbidden` when the acting user targets themselves
/// - `LastAdminProtected` when the target holds ADMIN and is the board's sole
///   administrator
pub fn check_remove_member(
    board_id: i64,
    acting_user: Uuid,
    target_user: Uuid,
    existing: Option<&Membership>,
    admin_count: i64,
) -> Result<(), DomainError> {
    let Some(current) = existing else {
        return Err(DomainError::MemberNotFound {
            board_id,
            user_id: target_user,
        });
    };
    if acting_user == target_user {
        return Err(DomainError::SelfRemovalForbidden);
    }
    if current.role == BoardRole::Admin && admin_count <= 1 {
        return Err(DomainError::LastAdminProtected);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn membership(role: BoardRole, user_id: Uuid) -> Membership {
        Membership {
            board_id: 1,
            user_id,
            role,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_add_new_member_allowed() {
        assert!(check_add_member(None, BoardRole::Member).is_ok());
        assert!(check_add_member(None, BoardRole::Viewer).is_ok());
    }

    #[test]
    fn test_add_existing_member_rejected() {
        let existing = membership(BoardRole::Viewer, Uuid::new_v4());
        let err = check_add_member(Some(&existing), BoardRole::Member).unwrap_err();
        assert!(matches!(err, DomainError::MemberAlreadyExists));
    }

    #[test]
    fn test_add_second_admin_rejected() {
        let err = check_add_member(None, BoardRole::Admin).unwrap_err();
        assert!(matches!(err, DomainError::SecondAdminNotAllowed));
    }

    #[test]
    fn test_update_missing_member_rejected() {
        let acting = Uuid::new_v4();
        let target = Uuid::new_v4();
        let err =
            check_update_member(1, acting, target, None, BoardRole::Viewer, 1).unwrap_err();
        assert!(matches!(err, DomainError::MemberNotFound { .. }));
    }

    #[test]
    fn test_self_demotion_rejected() {
        // The sole admin setting their own role to VIEWER is always rejected.
        let user = Uuid::new_v4();
        let current = membership(BoardRole::Admin, user);
        let err = check_update_member(1, user, user, Some(&current), BoardRole::Viewer, 1)
            .unwrap_err();
        assert!(matches!(err, DomainError::SelfDemotionForbidden));
    }

    #[test]
    fn test_self_update_to_admin_is_noop_success() {
        let user = Uuid::new_v4();
        let current = membership(BoardRole::Admin, user);
        assert!(
            check_update_member(1, user, user, Some(&current), BoardRole::Admin, 1).is_ok()
        );
    }

    #[test]
    fn test_promoting_member_to_admin_rejected() {
        let acting = Uuid::new_v4();
        let target = Uuid::new_v4();
        let current = membership(BoardRole::Member, target);
        let err = check_update_member(1, acting, target, Some(&current), BoardRole::Admin, 1)
            .unwrap_err();
        assert!(matches!(err, DomainError::SecondAdminNotAllowed));
    }

    #[test]
    fn test_demoting_sole_admin_rejected() {
        let acting = Uuid::new_v4();
        let target = Uuid::new_v4();
        let current = membership(BoardRole::Admin, target);
        let err = check_update_member(1, acting, target, Some(&current), BoardRole::Member, 1)
            .unwrap_err();
        assert!(matches!(err, DomainError::SecondAdminNotAllowed));
    }

    #[test]
    fn test_role_change_between_member_and_viewer_allowed() {
        let acting = Uuid::new_v4();
        let target = Uuid::new_v4();
        let current = membership(BoardRole::Member, target);
        assert!(
            check_update_member(1, acting, target, Some(&current), BoardRole::Viewer, 1).is_ok()
        );
        let current = membership(BoardRole::Viewer, target);
        assert!(
            check_update_member(1, acting, target, Some(&current), BoardRole::Member, 1).is_ok()
        );
    }

    #[test]
    fn test_remove_missing_member_rejected() {
        let err =
            check_remove_member(1, Uuid::new_v4(), Uuid::new_v4(), None, 1).unwrap_err();
        assert!(matches!(err, DomainError::MemberNotFound { .. }));
    }

    #[test]
    fn test_self_removal_rejected() {
        let user = Uuid::new_v4();
        let current = membership(BoardRole::Member, user);
        let err = check_remove_member(1, user, user, Some(&current), 1).unwrap_err();
        assert!(matches!(err, DomainError::SelfRemovalForbidden));
    }

    #[test]
    fn test_sole_admin_removal_rejected() {
        let acting = Uuid::new_v4();
        let target = Uuid::new_v4();
        let current = membership(BoardRole::Admin, target);
        let err = check_remove_member(1, acting, target, Some(&current), 1).unwrap_err();
        assert!(matches!(err, DomainError::LastAdminProtected));
    }

    #[test]
    fn test_remove_non_admin_allowed() {
        let acting = Uuid::new_v4();
        let target = Uuid::new_v4();
        let current = membership(BoardRole::Viewer, target);
        assert!(check_remove_member(1, acting, target, Some(&current), 1).is_ok());
    }

    #[test]
    fn test_admin_set_never_emptied() {
        // Property 4: simulate every guarded mutation against a one-admin
        // board; no permitted outcome leaves the admin set empty.
        let admin = Uuid::new_v4();
        let other = Uuid::new_v4();
        let admin_row = membership(BoardRole::Admin, admin);

        // Additions can never add or replace the admin.
        assert!(check_add_member(None, BoardRole::Admin).is_err());

        // No update path may demote the only admin.
        for requested in [BoardRole::Member, BoardRole::Viewer] {
            assert!(
                check_update_member(1, admin, admin, Some(&admin_row), requested, 1).is_err()
            );
            assert!(
                check_update_member(1, other, admin, Some(&admin_row), requested, 1).is_err()
            );
        }

        // No removal path may delete the only admin.
        assert!(check_remove_member(1, admin, admin, Some(&admin_row), 1).is_err());
        assert!(check_remove_member(1, other, admin, Some(&admin_row), 1).is_err());
    }
}
