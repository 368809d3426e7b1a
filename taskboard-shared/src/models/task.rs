/// Task model
///
/// Tasks order themselves within a column by a decimal position key. Unlike
/// column positions, task positions carry no unique constraint: a transient
/// collision is tolerated and resolved by the next renumbering.
///
/// # Schema
///
/// ```sql
/// CREATE TABLE tasks (
///     id BIGSERIAL PRIMARY KEY,
///     board_id BIGINT NOT NULL REFERENCES boards(id) ON DELETE CASCADE,
///     column_id BIGINT NOT NULL REFERENCES columns(id) ON DELETE CASCADE,
///     title VARCHAR(70) NOT NULL,
///     description VARCHAR(200) NOT NULL DEFAULT '',
///     position NUMERIC(16,8) NOT NULL,
///     assignee_id UUID REFERENCES users(id) ON DELETE SET NULL,
///     owner_id UUID NOT NULL REFERENCES users(id),
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
/// );
/// ```

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::PgExecutor;
use std::collections::HashMap;
use uuid::Uuid;

/// Task row
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Task {
    /// Task ID
    pub id: i64,

    /// Owning board
    pub board_id: i64,

    /// Column the task currently sits in
    pub column_id: i64,

    /// Task title
    pub title: String,

    /// Free-form description
    pub description: String,

    /// Ordering key within the column
    pub position: Decimal,

    /// Optional assignee; must hold a membership on the board
    pub assignee_id: Option<Uuid>,

    /// User who created the task
    pub owner_id: Uuid,

    /// When the task was created
    pub created_at: DateTime<Utc>,
}

/// Input for creating a task
#[derive(Debug, Clone)]
pub struct CreateTask {
    pub title: String,
    pub description: String,
    pub assignee_id: Option<Uuid>,
}

/// Partial update of a task's attributes
#[derive(Debug, Clone, Default)]
pub struct UpdateTask {
    pub title: Option<String>,
    pub description: Option<String>,
    /// Some(None) clears the assignee, Some(Some(id)) sets it, None leaves it
    pub assignee_id: Option<Option<Uuid>>,
}

impl Task {
    /// Inserts a task into a column at the given position
    pub async fn create(
        ex: impl PgExecutor<'_>,
        board_id: i64,
        column_id: i64,
        owner_id: Uuid,
        position: Decimal,
        data: CreateTask,
    ) -> Result<Self, sqlx::Error> {
        sqlx::query_as::<_, Task>(
            r#"
            INSERT INTO tasks (board_id, column_id, title, description, position, assignee_id, owner_id)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING id, board_id, column_id, title, description, position, assignee_id, owner_id, created_at
            "#,
        )
        .bind(board_id)
        .bind(column_id)
        .bind(data.title)
        .bind(data.description)
        .bind(position)
        .bind(data.assignee_id)
        .bind(owner_id)
        .fetch_one(ex)
        .await
    }

    /// Finds a task within a board
    pub async fn find(
        ex: impl PgExecutor<'_>,
        board_id: i64,
        task_id: i64,
    ) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, Task>(
            r#"
            SELECT id, board_id, column_id, title, description, position, assignee_id, owner_id, created_at
            FROM tasks
            WHERE id = $1 AND board_id = $2
            "#,
        )
        .bind(task_id)
        .bind(board_id)
        .fetch_optional(ex)
        .await
    }

    /// Finds a task and locks its row for the remainder of the transaction,
    /// serializing concurrent moves of the same task.
    pub async fn find_for_update(
        ex: impl PgExecutor<'_>,
        board_id: i64,
        task_id: i64,
    ) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, Task>(
            r#"
            SELECT id, board_id, column_id, title, description, position, assignee_id, owner_id, created_at
            FROM tasks
            WHERE id = $1 AND board_id = $2
            FOR UPDATE
            "#,
        )
        .bind(task_id)
        .bind(board_id)
        .fetch_optional(ex)
        .await
    }

    /// Lists a column's tasks in display order
    pub async fn list_for_column(
        ex: impl PgExecutor<'_>,
        column_id: i64,
    ) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as::<_, Task>(
            r#"
            SELECT id, board_id, column_id, title, description, position, assignee_id, owner_id, created_at
            FROM tasks
            WHERE column_id = $1
            ORDER BY position ASC, id ASC
            "#,
        )
        .bind(column_id)
        .fetch_all(ex)
        .await
    }

    /// Number of tasks currently in a column
    ///
    /// For capacity checks this must be read after locking the column row,
    /// inside the same unit of work as the admission decision.
    pub async fn count_in_column(
        ex: impl PgExecutor<'_>,
        column_id: i64,
    ) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar("SELECT COUNT(*) FROM tasks WHERE column_id = $1")
            .bind(column_id)
            .fetch_one(ex)
            .await
    }

    /// Current maximum position in a column, if any
    pub async fn max_position(
        ex: impl PgExecutor<'_>,
        column_id: i64,
    ) -> Result<Option<Decimal>, sqlx::Error> {
        sqlx::query_scalar("SELECT MAX(position) FROM tasks WHERE column_id = $1")
            .bind(column_id)
            .fetch_one(ex)
            .await
    }

    /// Positions of the given tasks within one column, keyed by task id.
    ///
    /// Neighbor ids that do not exist in the column are simply absent from
    /// the map; the position allocator treats a missing neighbor as open.
    pub async fn positions_by_ids(
        ex: impl PgExecutor<'_>,
        column_id: i64,
        task_ids: &[i64],
    ) -> Result<HashMap<i64, Decimal>, sqlx::Error> {
        if task_ids.is_empty() {
            return Ok(HashMap::new());
        }
        let rows: Vec<(i64, Decimal)> = sqlx::query_as(
            r#"
            SELECT id, position FROM tasks
            WHERE column_id = $1 AND id = ANY($2)
            "#,
        )
        .bind(column_id)
        .bind(task_ids)
        .fetch_all(ex)
        .await?;
        Ok(rows.into_iter().collect())
    }

    /// Applies a partial update; returns the new row, or None when absent
    pub async fn update(
        ex: impl PgExecutor<'_>,
        board_id: i64,
        column_id: i64,
        task_id: i64,
        data: UpdateTask,
    ) -> Result<Option<Self>, sqlx::Error> {
        let (set_assignee, new_assignee) = match data.assignee_id {
            Some(value) => (true, value),
            None => (false, None),
        };
        sqlx::query_as::<_, Task>(
            r#"
            UPDATE tasks
            SET title = COALESCE($4, title),
                description = COALESCE($5, description),
                assignee_id = CASE WHEN $6 THEN $7 ELSE assignee_id END
            WHERE id = $1 AND board_id = $2 AND column_id = $3
            RETURNING id, board_id, column_id, title, description, position, assignee_id, owner_id, created_at
            "#,
        )
        .bind(task_id)
        .bind(board_id)
        .bind(column_id)
        .bind(data.title)
        .bind(data.description)
        .bind(set_assignee)
        .bind(new_assignee)
        .fetch_optional(ex)
        .await
    }

    /// Moves a task to a column at a new position
    pub async fn move_to(
        ex: impl PgExecutor<'_>,
        task_id: i64,
        column_id: i64,
        position: Decimal,
    ) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, Task>(
            r#"
            UPDATE tasks
            SET column_id = $2, position = $3
            WHERE id = $1
            RETURNING id, board_id, column_id, title, description, position, assignee_id, owner_id, created_at
            "#,
        )
        .bind(task_id)
        .bind(column_id)
        .bind(position)
        .fetch_optional(ex)
        .await
    }

    /// Deletes a task
    pub async fn delete(
        ex: impl PgExecutor<'_>,
        board_id: i64,
        column_id: i64,
        task_id: i64,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "DELETE FROM tasks WHERE id = $1 AND board_id = $2 AND column_id = $3",
        )
        .bind(task_id)
        .bind(board_id)
        .bind(column_id)
        .execute(ex)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Renumbers every task in a column to evenly spaced integer positions
    /// (1, 2, 3, …) preserving the current display order.
    ///
    /// Invoked when midpoint insertion has exhausted the key's precision;
    /// must run inside the same unit of work as the insertion that triggered
    /// it so readers never observe the intermediate state.
    pub async fn renumber_column(
        ex: impl PgExecutor<'_>,
        column_id: i64,
    ) -> Result<u64, sqlx::Error> {
        let result = sqlx::query(
            r#"
            UPDATE tasks
            SET position = ordered.rn
            FROM (
                SELECT id, ROW_NUMBER() OVER (ORDER BY position ASC, id ASC) AS rn
                FROM tasks
                WHERE column_id = $1
            ) AS ordered
            WHERE tasks.id = ordered.id
            "#,
        )
        .bind(column_id)
        .execute(ex)
        .await?;
        Ok(result.rows_affected())
    }
}
