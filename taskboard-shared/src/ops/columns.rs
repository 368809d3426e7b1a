/// Column operations
///
/// Column positions carry a uniqueness constraint within the board, so an
/// explicit position that collides surfaces as a database error rather than
/// silently reordering anything. Unspecified positions append.

use crate::auth::authorization::{require_board_role, ANY_ROLE, CONTENT_EDITORS};
use crate::error::{DomainError, DomainResult};
use crate::models::{Column, CreateColumn, Task, UpdateColumn};
use crate::ops::{BoardOps, ColumnDetail};
use crate::ordering;
use futures::FutureExt;
use uuid::Uuid;

impl BoardOps {
    /// Adds a column to a board, appending when no position is given
    pub async fn create_column(
        &self,
        acting_user: Uuid,
        board_id: i64,
        data: CreateColumn,
    ) -> DomainResult<Column> {
        self.coordinator
            .run(move |conn| {
                async move {
                    require_board_role(conn, board_id, acting_user, CONTENT_EDITORS).await?;
                    let position = match data.position {
                        Some(position) => position,
                        None => {
                            ordering::append_after(Column::max_position(&mut *conn, board_id).await?)
                        }
                    };
                    let column =
                        Column::create(&mut *conn, board_id, data.name, position, data.wip_limit)
                            .await?;
                    Ok(column)
                }
                .boxed()
            })
            .await
    }

    /// Fetches a column with its ordered tasks
    pub async fn get_column(
        &self,
        acting_user: Uuid,
        board_id: i64,
        column_id: i64,
    ) -> DomainResult<ColumnDetail> {
        self.coordinator
            .run_read_only(move |conn| {
                async move {
                    require_board_role(conn, board_id, acting_user, ANY_ROLE).await?;
                    let column = Column::find(&mut *conn, board_id, column_id)
                        .await?
                        .ok_or(DomainError::ColumnNotFound(column_id))?;
                    let tasks = Task::list_for_column(&mut *conn, column_id).await?;
                    Ok(ColumnDetail { column, tasks })
                }
                .boxed()
            })
            .await
    }

    /// Updates a column's name and/or WIP limit.
    ///
    /// Lowering the limit below the current occupancy is allowed; it only
    /// constrains future admissions.
    pub async fn update_column(
        &self,
        acting_user: Uuid,
        board_id: i64,
        column_id: i64,
        data: UpdateColumn,
    ) -> DomainResult<Column> {
        self.coordinator
            .run(move |conn| {
                async move {
                    require_board_role(conn, board_id, acting_user, CONTENT_EDITORS).await?;
                    Column::update(&mut *conn, board_id, column_id, data)
                        .await?
                        .ok_or(DomainError::ColumnNotFound(column_id))
                }
                .boxed()
            })
            .await
    }

    /// Deletes a column; its tasks go with it
    pub async fn delete_column(
        &self,
        acting_user: Uuid,
        board_id: i64,
        column_id: i64,
    ) -> DomainResult<()> {
        self.coordinator
            .run(move |conn| {
                async move {
                    require_board_role(conn, board_id, acting_user, CONTENT_EDITORS).await?;
                    if !Column::delete(&mut *conn, board_id, column_id).await? {
                        return Err(DomainError::ColumnNotFound(column_id));
                    }
                    Ok(())
                }
                .boxed()
            })
            .await
    }
}
