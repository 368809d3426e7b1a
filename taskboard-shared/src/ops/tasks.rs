/// Task operations
///
/// Creation and moves are the admission-controlled paths. Both lock the
/// destination column row first, so the occupancy they read stays valid for
/// the rest of the unit of work, and both allocate the new position key from
/// neighbor keys read in that same snapshot.
///
/// A move progresses Validated → CapacityChecked → Positioned → Committed →
/// Published; any rejection rolls the whole unit of work back and nothing is
/// published. The `task_moved` event is handed to the fanout strictly after
/// commit, so observers can never see a move that did not happen.

use crate::admission::check_capacity;
use crate::auth::authorization::{require_board_role, ANY_ROLE, CONTENT_EDITORS};
use crate::error::{DomainError, DomainResult};
use crate::events::BoardEvent;
use crate::models::{Column, CreateTask, Membership, Task, UpdateTask};
use crate::ops::BoardOps;
use crate::ordering;
use futures::FutureExt;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::Deserialize;
use sqlx::PgConnection;
use tracing::info;
use uuid::Uuid;

/// Move request: destination column and the neighbors the task should land
/// between. `above_task_id` is the task that will precede it (smaller key),
/// `below_task_id` the one that will follow it. With neither set the task is
/// appended to the end of the destination column.
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct MoveTask {
    pub to_column_id: i64,

    pub above_task_id: Option<i64>,

    pub below_task_id: Option<i64>,
}

/// Allocates the position key for a task landing in `column_id` between the
/// given neighbors.
///
/// When midpoint insertion has exhausted the key's precision the column is
/// renumbered to evenly spaced integers and the key recomputed, all inside
/// the caller's unit of work. Neighbor ids that are not in the column are
/// treated as absent.
async fn allocate_position(
    conn: &mut PgConnection,
    column_id: i64,
    above_task_id: Option<i64>,
    below_task_id: Option<i64>,
) -> DomainResult<Decimal> {
    if above_task_id.is_none() && below_task_id.is_none() {
        let max = Task::max_position(&mut *conn, column_id).await?;
        return Ok(ordering::append_after(max));
    }

    let neighbor_ids: Vec<i64> = above_task_id
        .into_iter()
        .chain(below_task_id)
        .collect();

    let positions = Task::positions_by_ids(&mut *conn, column_id, &neighbor_ids).await?;
    let above = above_task_id.and_then(|id| positions.get(&id).copied());
    let below = below_task_id.and_then(|id| positions.get(&id).copied());
    let key = ordering::between(above, below);

    if !ordering::needs_rebalance(&key) {
        return Ok(key);
    }

    info!(column_id, "Position precision exhausted, renumbering column");
    Task::renumber_column(&mut *conn, column_id).await?;

    let positions = Task::positions_by_ids(&mut *conn, column_id, &neighbor_ids).await?;
    let above = above_task_id.and_then(|id| positions.get(&id).copied());
    let below = below_task_id.and_then(|id| positions.get(&id).copied());
    Ok(ordering::between(above, below))
}

/// Rejects an assignee who holds no membership on the board
async fn check_assignee(
    conn: &mut PgConnection,
    board_id: i64,
    assignee_id: Uuid,
) -> DomainResult<()> {
    if !Membership::exists(&mut *conn, board_id, assignee_id).await? {
        return Err(DomainError::Validation(format!(
            "assignee {} is not a member of board {}",
            assignee_id, board_id
        )));
    }
    Ok(())
}

impl BoardOps {
    /// Creates a task at the end of a column, subject to its WIP limit
    pub async fn create_task(
        &self,
        acting_user: Uuid,
        board_id: i64,
        column_id: i64,
        data: CreateTask,
    ) -> DomainResult<Task> {
        self.coordinator
            .run(move |conn| {
                async move {
                    require_board_role(conn, board_id, acting_user, CONTENT_EDITORS).await?;

                    // Lock the column before reading its occupancy.
                    let column = Column::find_for_update(&mut *conn, board_id, column_id)
                        .await?
                        .ok_or(DomainError::ColumnNotFound(column_id))?;

                    if let Some(assignee_id) = data.assignee_id {
                        check_assignee(conn, board_id, assignee_id).await?;
                    }

                    let occupied = Task::count_in_column(&mut *conn, column_id).await?;
                    check_capacity(column_id, column.wip_limit, occupied)?;

                    let position =
                        ordering::append_after(Task::max_position(&mut *conn, column_id).await?);
                    let task =
                        Task::create(&mut *conn, board_id, column_id, acting_user, position, data)
                            .await?;
                    Ok(task)
                }
                .boxed()
            })
            .await
    }

    /// Fetches a task
    pub async fn get_task(
        &self,
        acting_user: Uuid,
        board_id: i64,
        task_id: i64,
    ) -> DomainResult<Task> {
        self.coordinator
            .run_read_only(move |conn| {
                async move {
                    require_board_role(conn, board_id, acting_user, ANY_ROLE).await?;
                    Task::find(&mut *conn, board_id, task_id)
                        .await?
                        .ok_or(DomainError::TaskNotFound(task_id))
                }
                .boxed()
            })
            .await
    }

    /// Updates a task's title, description, and/or assignee
    pub async fn update_task(
        &self,
        acting_user: Uuid,
        board_id: i64,
        task_id: i64,
        data: UpdateTask,
    ) -> DomainResult<Task> {
        self.coordinator
            .run(move |conn| {
                async move {
                    require_board_role(conn, board_id, acting_user, CONTENT_EDITORS).await?;

                    let task = Task::find(&mut *conn, board_id, task_id)
                        .await?
                        .ok_or(DomainError::TaskNotFound(task_id))?;

                    if let Some(Some(assignee_id)) = data.assignee_id {
                        check_assignee(conn, board_id, assignee_id).await?;
                    }

                    Task::update(&mut *conn, board_id, task.column_id, task_id, data)
                        .await?
                        .ok_or(DomainError::TaskNotFound(task_id))
                }
                .boxed()
            })
            .await
    }

    /// Deletes a task
    pub async fn delete_task(
        &self,
        acting_user: Uuid,
        board_id: i64,
        task_id: i64,
    ) -> DomainResult<()> {
        self.coordinator
            .run(move |conn| {
                async move {
                    require_board_role(conn, board_id, acting_user, CONTENT_EDITORS).await?;
                    let task = Task::find(&mut *conn, board_id, task_id)
                        .await?
                        .ok_or(DomainError::TaskNotFound(task_id))?;
                    Task::delete(&mut *conn, board_id, task.column_id, task_id).await?;
                    Ok(())
                }
                .boxed()
            })
            .await
    }

    /// Moves a task to a column and position.
    ///
    /// Capacity is checked against the destination only when the column
    /// changes; reordering within a column cannot exceed any limit. The
    /// `task_moved` event is published only after the move has committed.
    pub async fn move_task(
        &self,
        acting_user: Uuid,
        board_id: i64,
        task_id: i64,
        req: MoveTask,
    ) -> DomainResult<Task> {
        let moved = self
            .coordinator
            .run(move |conn| {
                async move {
                    require_board_role(conn, board_id, acting_user, CONTENT_EDITORS).await?;

                    let task = Task::find_for_update(&mut *conn, board_id, task_id)
                        .await?
                        .ok_or(DomainError::TaskNotFound(task_id))?;
                    let dest = Column::find_for_update(&mut *conn, board_id, req.to_column_id)
                        .await?
                        .ok_or(DomainError::ColumnNotFound(req.to_column_id))?;

                    if dest.id != task.column_id {
                        let occupied = Task::count_in_column(&mut *conn, dest.id).await?;
                        check_capacity(dest.id, dest.wip_limit, occupied)?;
                    }

                    let position =
                        allocate_position(conn, dest.id, req.above_task_id, req.below_task_id)
                            .await?;

                    Task::move_to(&mut *conn, task.id, dest.id, position)
                        .await?
                        .ok_or(DomainError::TaskNotFound(task_id))
                }
                .boxed()
            })
            .await?;

        let new_position = moved.position.to_f64().unwrap_or_default();
        self.fanout.publish(
            board_id,
            &BoardEvent::task_moved(moved.id, moved.column_id, new_position),
        );

        info!(
            board_id,
            task_id,
            column_id = moved.column_id,
            "Task moved"
        );
        Ok(moved)
    }
}
