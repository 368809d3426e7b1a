/// Column model
///
/// Columns order themselves within a board by a decimal position key and may
/// carry a WIP limit capping how many tasks they hold.
///
/// # Schema
///
/// ```sql
/// CREATE TABLE columns (
///     id BIGSERIAL PRIMARY KEY,
///     board_id BIGINT NOT NULL REFERENCES boards(id) ON DELETE CASCADE,
///     name VARCHAR(100) NOT NULL,
///     position NUMERIC(16,8) NOT NULL,
///     wip_limit INTEGER CHECK (wip_limit > 0),
///     UNIQUE (board_id, name),
///     UNIQUE (board_id, position)
/// );
/// ```

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::PgExecutor;

/// Column row
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Column {
    /// Column ID
    pub id: i64,

    /// Owning board
    pub board_id: i64,

    /// Column name, unique within the board
    pub name: String,

    /// Ordering key, unique within the board
    pub position: Decimal,

    /// Optional WIP limit; None = unlimited
    pub wip_limit: Option<i32>,
}

/// Input for creating a column
#[derive(Debug, Clone)]
pub struct CreateColumn {
    pub name: String,
    /// Explicit position; appended after the current maximum when None
    pub position: Option<Decimal>,
    pub wip_limit: Option<i32>,
}

/// Partial update of a column's attributes
#[derive(Debug, Clone, Default)]
pub struct UpdateColumn {
    pub name: Option<String>,
    /// Some(None) clears the limit, Some(Some(n)) sets it, None leaves it
    pub wip_limit: Option<Option<i32>>,
}

impl Column {
    /// Inserts a column at the given position
    pub async fn create(
        ex: impl PgExecutor<'_>,
        board_id: i64,
        name: String,
        position: Decimal,
        wip_limit: Option<i32>,
    ) -> Result<Self, sqlx::Error> {
        sqlx::query_as::<_, Column>(
            r#"
            INSERT INTO columns (board_id, name, position, wip_limit)
            VALUES ($1, $2, $3, $4)
            RETURNING id, board_id, name, position, wip_limit
            "#,
        )
        .bind(board_id)
        .bind(name)
        .bind(position)
        .bind(wip_limit)
        .fetch_one(ex)
        .await
    }

    /// Finds a column within a board
    pub async fn find(
        ex: impl PgExecutor<'_>,
        board_id: i64,
        column_id: i64,
    ) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, Column>(
            r#"
            SELECT id, board_id, name, position, wip_limit
            FROM columns
            WHERE id = $1 AND board_id = $2
            "#,
        )
        .bind(column_id)
        .bind(board_id)
        .fetch_optional(ex)
        .await
    }

    /// Finds a column and takes a row-level lock on it for the remainder of
    /// the current transaction.
    ///
    /// The lock serializes the capacity check against concurrent admissions
    /// into the same column: the count read after this call cannot be
    /// invalidated by another create/move until this unit of work ends.
    pub async fn find_for_update(
        ex: impl PgExecutor<'_>,
        board_id: i64,
        column_id: i64,
    ) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, Column>(
            r#"
            SELECT id, board_id, name, position, wip_limit
            FROM columns
            WHERE id = $1 AND board_id = $2
            FOR UPDATE
            "#,
        )
        .bind(column_id)
        .bind(board_id)
        .fetch_optional(ex)
        .await
    }

    /// Lists a board's columns in display order
    pub async fn list_for_board(
        ex: impl PgExecutor<'_>,
        board_id: i64,
    ) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as::<_, Column>(
            r#"
            SELECT id, board_id, name, position, wip_limit
            FROM columns
            WHERE board_id = $1
            ORDER BY position ASC
            "#,
        )
        .bind(board_id)
        .fetch_all(ex)
        .await
    }

    /// Current maximum position among a board's columns, if any
    pub async fn max_position(
        ex: impl PgExecutor<'_>,
        board_id: i64,
    ) -> Result<Option<Decimal>, sqlx::Error> {
        sqlx::query_scalar("SELECT MAX(position) FROM columns WHERE board_id = $1")
            .bind(board_id)
            .fetch_one(ex)
            .await
    }

    /// Applies a partial update; returns the new row, or None when absent
    pub async fn update(
        ex: impl PgExecutor<'_>,
        board_id: i64,
        column_id: i64,
        data: UpdateColumn,
    ) -> Result<Option<Self>, sqlx::Error> {
        let (set_limit, new_limit) = match data.wip_limit {
            Some(value) => (true, value),
            None => (false, None),
        };
        sqlx::query_as::<_, Column>(
            r#"
            UPDATE columns
            SET name = COALESCE($3, name),
                wip_limit = CASE WHEN $4 THEN $5 ELSE wip_limit END
            WHERE id = $1 AND board_id = $2
            RETURNING id, board_id, name, position, wip_limit
            "#,
        )
        .bind(column_id)
        .bind(board_id)
        .bind(data.name)
        .bind(set_limit)
        .bind(new_limit)
        .fetch_optional(ex)
        .await
    }

    /// Deletes the column; its tasks cascade
    pub async fn delete(
        ex: impl PgExecutor<'_>,
        board_id: i64,
        column_id: i64,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM columns WHERE id = $1 AND board_id = $2")
            .bind(column_id)
            .bind(board_id)
            .execute(ex)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
