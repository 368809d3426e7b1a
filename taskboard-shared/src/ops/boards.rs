/// Board operations
///
/// Creating a board also inserts the creator's ADMIN membership in the same
/// unit of work; there is no moment at which a board exists without an
/// administrator.

use crate::auth::authorization::{require_board_role, ADMIN_ONLY, ANY_ROLE};
use crate::error::{DomainError, DomainResult};
use crate::models::{Board, BoardRole, Column, CreateBoard, Membership, UpdateBoard};
use crate::ops::{BoardDetail, BoardOps};
use crate::pagination::Pagination;
use futures::FutureExt;
use tracing::info;
use uuid::Uuid;

impl BoardOps {
    /// Creates a board with `acting_user` as its administrator
    pub async fn create_board(
        &self,
        acting_user: Uuid,
        data: CreateBoard,
    ) -> DomainResult<Board> {
        let board = self
            .coordinator
            .run(move |conn| {
                async move {
                    let board = Board::create(&mut *conn, acting_user, data).await?;
                    Membership::create(&mut *conn, board.id, acting_user, BoardRole::Admin)
                        .await?;
                    Ok(board)
                }
                .boxed()
            })
            .await?;

        info!(board_id = board.id, %acting_user, "Board created");
        Ok(board)
    }

    /// Lists the boards `acting_user` belongs to, paginated
    pub async fn list_boards(
        &self,
        acting_user: Uuid,
        page: Pagination,
    ) -> DomainResult<Vec<Board>> {
        page.validate()?;
        let boards =
            Board::list_for_user(self.coordinator.pool(), acting_user, page.limit, page.offset)
                .await?;
        Ok(boards)
    }

    /// Fetches a board with its ordered columns
    pub async fn get_board(&self, acting_user: Uuid, board_id: i64) -> DomainResult<BoardDetail> {
        self.coordinator
            .run_read_only(move |conn| {
                async move {
                    require_board_role(conn, board_id, acting_user, ANY_ROLE).await?;
                    let board = Board::find(&mut *conn, board_id)
                        .await?
                        .ok_or(DomainError::BoardNotFound(board_id))?;
                    let columns = Column::list_for_board(&mut *conn, board_id).await?;
                    Ok(BoardDetail { board, columns })
                }
                .boxed()
            })
            .await
    }

    /// Updates a board's name and/or description (ADMIN only)
    pub async fn update_board(
        &self,
        acting_user: Uuid,
        board_id: i64,
        data: UpdateBoard,
    ) -> DomainResult<Board> {
        self.coordinator
            .run(move |conn| {
                async move {
                    require_board_role(conn, board_id, acting_user, ADMIN_ONLY).await?;
                    Board::update(&mut *conn, board_id, data)
                        .await?
                        .ok_or(DomainError::BoardNotFound(board_id))
                }
                .boxed()
            })
            .await
    }

    /// Deletes a board and everything on it (ADMIN only)
    pub async fn delete_board(&self, acting_user: Uuid, board_id: i64) -> DomainResult<()> {
        self.coordinator
            .run(move |conn| {
                async move {
                    require_board_role(conn, board_id, acting_user, ADMIN_ONLY).await?;
                    if !Board::delete(&mut *conn, board_id).await? {
                        return Err(DomainError::BoardNotFound(board_id));
                    }
                    Ok(())
                }
                .boxed()
            })
            .await?;

        info!(board_id, %acting_user, "Board deleted");
        Ok(())
    }
}
