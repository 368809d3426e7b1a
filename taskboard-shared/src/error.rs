/// Domain error taxonomy
///
/// Every operation in the board consistency engine fails with one of these
/// kinds. The set is closed: the API boundary maps each variant to exactly
/// one HTTP status with an exhaustive match, so adding a variant forces the
/// mapping to be updated.
///
/// The transaction coordinator never swallows or retries a domain failure;
/// it rolls back the unit of work and re-raises the error unchanged.

use uuid::Uuid;

/// Result alias used throughout the shared crate
pub type DomainResult<T> = Result<T, DomainError>;

/// All failures a board operation can produce
#[derive(Debug, thiserror::Error)]
pub enum DomainError {
    /// Board does not exist (or is not visible to the caller)
    #[error("board {0} not found")]
    BoardNotFound(i64),

    /// Column does not exist within the board
    #[error("column {0} not found")]
    ColumnNotFound(i64),

    /// Task does not exist within the board/column
    #[error("task {0} not found")]
    TaskNotFound(i64),

    /// No membership for the (board, user) pair
    #[error("user {user_id} is not a member of board {board_id}")]
    MemberNotFound { board_id: i64, user_id: Uuid },

    /// No user account with this email
    #[error("no user with email {0}")]
    UserNotFound(String),

    /// Column is at its WIP limit
    #[error("column {column_id} is at its capacity limit of {limit}")]
    CapacityExceeded { column_id: i64, limit: i32 },

    /// The (board, user) pair already has a membership
    #[error("user is already a member of this board")]
    MemberAlreadyExists,

    /// Boards have exactly one administrator; only board creation grants it
    #[error("the board already has an administrator")]
    SecondAdminNotAllowed,

    /// A user cannot change their own role away from administrator
    #[error("you cannot demote yourself")]
    SelfDemotionForbidden,

    /// A user cannot remove their own membership
    #[error("you cannot remove yourself from the board")]
    SelfRemovalForbidden,

    /// The sole administrator of a board cannot be removed
    #[error("the only administrator of the board cannot be removed")]
    LastAdminProtected,

    /// Authenticated, but the caller's role does not permit the operation
    #[error("permission denied")]
    PermissionDenied,

    /// No authenticated identity on the request
    #[error("not authenticated")]
    Unauthenticated,

    /// Input is well-formed but semantically invalid
    #[error("validation failed: {0}")]
    Validation(String),

    /// Persistence failure; rolls back the unit of work
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl DomainError {
    /// Stable machine-readable code for the API boundary
    pub fn code(&self) -> &'static str {
        match self {
            DomainError::BoardNotFound(_)
            | DomainError::ColumnNotFound(_)
            | DomainError::TaskNotFound(_)
            | DomainError::MemberNotFound { .. }
            | DomainError::UserNotFound(_) => "not_found",
            DomainError::CapacityExceeded { .. } => "capacity_exceeded",
            DomainError::MemberAlreadyExists => "member_already_exists",
            DomainError::SecondAdminNotAllowed => "second_admin_not_allowed",
            DomainError::SelfDemotionForbidden => "self_demotion_forbidden",
            DomainError::SelfRemovalForbidden => "self_removal_forbidden",
            DomainError::LastAdminProtected => "last_admin_protected",
            DomainError::PermissionDenied => "permission_denied",
            DomainError::Unauthenticated => "unauthenticated",
            DomainError::Validation(_) => "validation_failed",
            DomainError::Database(_) => "internal_error",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = DomainError::BoardNotFound(7);
        assert_eq!(err.to_string(), "board 7 not found");

        let err = DomainError::CapacityExceeded {
            column_id: 3,
            limit: 5,
        };
        assert_eq!(
            err.to_string(),
            "column 3 is at its capacity limit of 5"
        );
    }

    #[test]
    fn test_error_codes_are_stable() {
        assert_eq!(DomainError::TaskNotFound(1).code(), "not_found");
        assert_eq!(
            DomainError::SecondAdminNotAllowed.code(),
            "second_admin_not_allowed"
        );
        assert_eq!(
            DomainError::Validation("bad".into()).code(),
            "validation_failed"
        );
    }
}
