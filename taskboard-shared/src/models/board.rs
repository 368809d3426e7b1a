/// Board model
///
/// A board is the unit of collaboration: it owns columns, tasks, and a
/// membership set. The owner is implicitly the board's administrator; the
/// ADMIN membership row is inserted in the same unit of work as the board.
///
/// # Schema
///
/// ```sql
/// CREATE TABLE boards (
///     id BIGSERIAL PRIMARY KEY,
///     name VARCHAR(100) NOT NULL,
///     description VARCHAR(500) NOT NULL DEFAULT '',
///     owner_id UUID NOT NULL REFERENCES users(id),
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
/// );
/// ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgExecutor;
use uuid::Uuid;

/// Board row
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Board {
    /// Board ID
    pub id: i64,

    /// Board name
    pub name: String,

    /// Free-form description
    pub description: String,

    /// Owning user; always holds the ADMIN membership
    pub owner_id: Uuid,

    /// When the board was created
    pub created_at: DateTime<Utc>,
}

/// Input for creating a board
#[derive(Debug, Clone)]
pub struct CreateBoard {
    pub name: String,
    pub description: String,
}

/// Partial update of a board's attributes
#[derive(Debug, Clone, Default)]
pub struct UpdateBoard {
    pub name: Option<String>,
    pub description: Option<String>,
}

impl Board {
    /// Inserts a new board owned by `owner_id`
    pub async fn create(
        ex: impl PgExecutor<'_>,
        owner_id: Uuid,
        data: CreateBoard,
    ) -> Result<Self, sqlx::Error> {
        sqlx::query_as::<_, Board>(
            r#"
            INSERT INTO boards (name, description, owner_id)
            VALUES ($1, $2, $3)
            RETURNING id, name, description, owner_id, created_at
            "#,
        )
        .bind(data.name)
        .bind(data.description)
        .bind(owner_id)
        .fetch_one(ex)
        .await
    }

    /// Finds a board by primary key
    pub async fn find(
        ex: impl PgExecutor<'_>,
        board_id: i64,
    ) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, Board>(
            r#"
            SELECT id, name, description, owner_id, created_at
            FROM boards
            WHERE id = $1
            "#,
        )
        .bind(board_id)
        .fetch_optional(ex)
        .await
    }

    /// Lists boards the user holds a membership on, newest first
    pub async fn list_for_user(
        ex: impl PgExecutor<'_>,
        user_id: Uuid,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as::<_, Board>(
            r#"
            SELECT b.id, b.name, b.description, b.owner_id, b.created_at
            FROM boards b
            JOIN board_members m ON m.board_id = b.id
            WHERE m.user_id = $1
            ORDER BY b.created_at DESC, b.id DESC
            LIMIT $2 OFFSET $3
            "#,
        )
        .bind(user_id)
        .bind(limit)
        .bind(offset)
        .fetch_all(ex)
        .await
    }

    /// Applies a partial update; returns the new row, or None when absent
    pub async fn update(
        ex: impl PgExecutor<'_>,
        board_id: i64,
        data: UpdateBoard,
    ) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, Board>(
            r#"
            UPDATE boards
            SET name = COALESCE($2, name),
                description = COALESCE($3, description)
            WHERE id = $1
            RETURNING id, name, description, owner_id, created_at
            "#,
        )
        .bind(board_id)
        .bind(data.name)
        .bind(data.description)
        .fetch_optional(ex)
        .await
    }

    /// Deletes the board; memberships, columns, and tasks cascade
    pub async fn delete(
        ex: impl PgExecutor<'_>,
        board_id: i64,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM boards WHERE id = $1")
            .bind(board_id)
            .execute(ex)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
