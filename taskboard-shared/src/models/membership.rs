/// Board membership model
///
/// Many-to-many relationship between users and boards with a role. The
/// invariants over this table (one administrator per board, never zero) are
/// enforced by [`crate::guard`], evaluated inside the unit of work before any
/// mutation here commits.
///
/// # Schema
///
/// ```sql
/// CREATE TYPE board_role AS ENUM ('admin', 'member', 'viewer');
///
/// CREATE TABLE board_members (
///     board_id BIGINT NOT NULL REFERENCES boards(id) ON DELETE CASCADE,
///     user_id UUID NOT NULL REFERENCES users(id) ON DELETE CASCADE,
///     role board_role NOT NULL,
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     PRIMARY KEY (board_id, user_id)
/// );
/// ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgExecutor;
use uuid::Uuid;

/// Role a user holds on one board
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "board_role", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum BoardRole {
    /// Manages membership and the board itself; exactly one per board
    Admin,

    /// Creates, edits, moves, and deletes columns and tasks
    Member,

    /// Read-only access, including the live event stream
    Viewer,
}

impl BoardRole {
    /// String form used in logs and messages
    pub fn as_str(&self) -> &'static str {
        match self {
            BoardRole::Admin => "admin",
            BoardRole::Member => "member",
            BoardRole::Viewer => "viewer",
        }
    }

    /// Can create/update/delete columns and tasks
    pub fn can_edit_content(&self) -> bool {
        matches!(self, BoardRole::Admin | BoardRole::Member)
    }

    /// Can manage the membership set and the board itself
    pub fn can_manage_board(&self) -> bool {
        matches!(self, BoardRole::Admin)
    }
}

/// Membership row: (board, user) pair with a role
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Membership {
    /// Board ID
    pub board_id: i64,

    /// User ID
    pub user_id: Uuid,

    /// Role within the board
    pub role: BoardRole,

    /// When the membership was created
    pub created_at: DateTime<Utc>,
}

impl Membership {
    /// Inserts a membership row
    ///
    /// # Errors
    ///
    /// Returns an error on a duplicate (board, user) pair or when the board
    /// or user does not exist. The guard checks run first, so a duplicate
    /// here indicates a bug in the calling operation.
    pub async fn create(
        ex: impl PgExecutor<'_>,
        board_id: i64,
        user_id: Uuid,
        role: BoardRole,
    ) -> Result<Self, sqlx::Error> {
        sqlx::query_as::<_, Membership>(
            r#"
            INSERT INTO board_members (board_id, user_id, role)
            VALUES ($1, $2, $3)
            RETURNING board_id, user_id, role, created_at
            "#,
        )
        .bind(board_id)
        .bind(user_id)
        .bind(role)
        .fetch_one(ex)
        .await
    }

    /// Finds the membership for a (board, user) pair
    pub async fn find(
        ex: impl PgExecutor<'_>,
        board_id: i64,
        user_id: Uuid,
    ) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, Membership>(
            r#"
            SELECT board_id, user_id, role, created_at
            FROM board_members
            WHERE board_id = $1 AND user_id = $2
            "#,
        )
        .bind(board_id)
        .bind(user_id)
        .fetch_optional(ex)
        .await
    }

    /// Gets just the role for a (board, user) pair
    pub async fn get_role(
        ex: impl PgExecutor<'_>,
        board_id: i64,
        user_id: Uuid,
    ) -> Result<Option<BoardRole>, sqlx::Error> {
        sqlx::query_scalar(
            r#"
            SELECT role FROM board_members
            WHERE board_id = $1 AND user_id = $2
            "#,
        )
        .bind(board_id)
        .bind(user_id)
        .fetch_optional(ex)
        .await
    }

    /// Updates a member's role; returns the new row, or None when absent
    pub async fn update_role(
        ex: impl PgExecutor<'_>,
        board_id: i64,
        user_id: Uuid,
        role: BoardRole,
    ) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, Membership>(
            r#"
            UPDATE board_members
            SET role = $3
            WHERE board_id = $1 AND user_id = $2
            RETURNING board_id, user_id, role, created_at
            "#,
        )
        .bind(board_id)
        .bind(user_id)
        .bind(role)
        .fetch_optional(ex)
        .await
    }

    /// Removes a member from a board
    pub async fn delete(
        ex: impl PgExecutor<'_>,
        board_id: i64,
        user_id: Uuid,
    ) -> Result<bool, sqlx::Error> {
        let result =
            sqlx::query("DELETE FROM board_members WHERE board_id = $1 AND user_id = $2")
                .bind(board_id)
                .bind(user_id)
                .execute(ex)
                .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Lists a board's members, oldest first
    pub async fn list_for_board(
        ex: impl PgExecutor<'_>,
        board_id: i64,
    ) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as::<_, Membership>(
            r#"
            SELECT board_id, user_id, role, created_at
            FROM board_members
            WHERE board_id = $1
            ORDER BY created_at ASC
            "#,
        )
        .bind(board_id)
        .fetch_all(ex)
        .await
    }

    /// Counts ADMIN memberships on a board
    ///
    /// Used by the guard to protect the last administrator. Read inside the
    /// same unit of work as the mutation it protects.
    pub async fn admin_count(
        ex: impl PgExecutor<'_>,
        board_id: i64,
    ) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar(
            r#"
            SELECT COUNT(*) FROM board_members
            WHERE board_id = $1 AND role = 'admin'
            "#,
        )
        .bind(board_id)
        .fetch_one(ex)
        .await
    }

    /// Whether the user holds any membership on the board
    pub async fn exists(
        ex: impl PgExecutor<'_>,
        board_id: i64,
        user_id: Uuid,
    ) -> Result<bool, sqlx::Error> {
        sqlx::query_scalar(
            r#"
            SELECT EXISTS(
                SELECT 1 FROM board_members
                WHERE board_id = $1 AND user_id = $2
            )
            "#,
        )
        .bind(board_id)
        .bind(user_id)
        .fetch_one(ex)
        .await
    }
}
