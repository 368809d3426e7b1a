/// Board operations service
///
/// [`BoardOps`] is the single entry point for every externally visible
/// operation. It owns the transaction coordinator and the event fanout and
/// composes them with the pure guards and the position allocator: each
/// operation authorizes the caller, reads and validates inside one unit of
/// work, writes, and only after commit publishes any events.
///
/// Handlers in the api crate call these methods and do nothing else with the
/// database, so consistency rules live in exactly one place.

pub mod boards;
pub mod columns;
pub mod members;
pub mod tasks;

use crate::auth::authorization::{require_board_role, ANY_ROLE};
use crate::db::TxCoordinator;
use crate::error::DomainResult;
use crate::events::{BoardSubscription, EventFanout};
use crate::models::{Board, Column, Task};
use futures::FutureExt;
use serde::Serialize;
use std::sync::Arc;
use uuid::Uuid;

pub use tasks::MoveTask;

/// Orchestrates units of work, guards, position allocation, and event
/// publication for all board operations
#[derive(Clone)]
pub struct BoardOps {
    coordinator: TxCoordinator,
    fanout: Arc<EventFanout>,
}

impl BoardOps {
    /// Creates the service over a coordinator and a fanout
    pub fn new(coordinator: TxCoordinator, fanout: Arc<EventFanout>) -> Self {
        Self { coordinator, fanout }
    }

    /// The event fanout, for subscribing streams
    pub fn fanout(&self) -> &Arc<EventFanout> {
        &self.fanout
    }

    /// Subscribes the caller to a board's live events.
    ///
    /// Any role may observe, including viewers. The returned guard
    /// unsubscribes when dropped, so a disconnected stream cleans itself up.
    pub async fn subscribe_board_events(
        &self,
        acting_user: Uuid,
        board_id: i64,
    ) -> DomainResult<BoardSubscription> {
        self.coordinator
            .run_read_only(move |conn| {
                async move {
                    require_board_role(conn, board_id, acting_user, ANY_ROLE).await?;
                    Ok(())
                }
                .boxed()
            })
            .await?;

        Ok(self.fanout.subscribe(board_id))
    }
}

/// A board together with its ordered columns
#[derive(Debug, Clone, Serialize)]
pub struct BoardDetail {
    #[serde(flatten)]
    pub board: Board,

    /// Columns in display order
    pub columns: Vec<Column>,
}

/// A column together with its ordered tasks
#[derive(Debug, Clone, Serialize)]
pub struct ColumnDetail {
    #[serde(flatten)]
    pub column: Column,

    /// Tasks in display order
    pub tasks: Vec<Task>,
}
