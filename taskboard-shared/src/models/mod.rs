/// Database models
///
/// Each entity gets a row struct (`sqlx::FromRow`) plus the queries that
/// operate on it. Query functions take `impl PgExecutor<'_>` so the same code
/// runs against the pool for plain reads and against a transaction when a
/// unit of work is in flight.

pub mod board;
pub mod column;
pub mod membership;
pub mod task;
pub mod user;

pub use board::{Board, CreateBoard, UpdateBoard};
pub use column::{Column, CreateColumn, UpdateColumn};
pub use membership::{BoardRole, Membership};
pub use task::{CreateTask, Task, UpdateTask};
pub use user::{CreateUser, User};
