/// Transaction coordinator (unit of work)
///
/// Every externally visible board operation runs inside exactly one unit of
/// work: the coordinator begins a transaction, hands the connection to the
/// operation closure, and commits on success or rolls back on any failure.
/// Domain checks and the mutations they protect therefore always see and
/// touch the same snapshot; partial application of an operation is
/// impossible.
///
/// The unit of work is passed explicitly as the closure's connection
/// parameter rather than carried implicitly on a receiver. The connection is
/// exclusively owned by the operation that opened it and must never be shared
/// across concurrently running operations.
///
/// Domain failures are re-raised unchanged after rollback; nothing is
/// swallowed or retried here. If the closure's future is dropped mid-flight
/// (caller cancelled), the transaction is dropped unfinished and the database
/// rolls it back.
///
/// # Example
///
/// ```no_run
/// use taskboard_shared::db::TxCoordinator;
/// use taskboard_shared::error::DomainError;
/// use futures::FutureExt;
///
/// # async fn example(coordinator: TxCoordinator) -> Result<(), DomainError> {
/// let count: i64 = coordinator
///     .run_read_only(|conn| {
///         async move {
///             let n = sqlx::query_scalar("SELECT COUNT(*) FROM boards")
///                 .fetch_one(conn)
///                 .await?;
///             Ok(n)
///         }
///         .boxed()
///     })
///     .await?;
/// # let _ = count;
/// # Ok(())
/// # }
/// ```

use crate::error::DomainError;
use futures::future::BoxFuture;
use sqlx::{PgConnection, PgPool};
use tracing::debug;

/// Coordinates units of work over a PostgreSQL pool
#[derive(Clone)]
pub struct TxCoordinator {
    pool: PgPool,
}

impl TxCoordinator {
    /// Creates a coordinator over the given pool
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// The underlying pool, for plain reads outside any unit of work
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Runs `op` inside one transaction.
    ///
    /// Commits when `op` returns `Ok`; rolls back and re-raises the error
    /// unchanged when it returns `Err`.
    ///
    /// # Errors
    ///
    /// Returns the operation's own error, or `DomainError::Database` if the
    /// transaction could not be started, committed, or rolled back.
    pub async fn run<T, F>(&self, op: F) -> Result<T, DomainError>
    where
        F: for<'c> FnOnce(&'c mut PgConnection) -> BoxFuture<'c, Result<T, DomainError>> + Send,
        T: Send,
    {
        let mut tx = self.pool.begin().await?;
        match op(&mut tx).await {
            Ok(value) => {
                tx.commit().await?;
                Ok(value)
            }
            Err(err) => {
                debug!(error = %err, "Rolling back unit of work");
                tx.rollback().await?;
                Err(err)
            }
        }
    }

    /// Runs `op` inside a transaction that is always rolled back.
    ///
    /// Gives read operations the same snapshot scoping as mutations without
    /// requiring a commit.
    pub async fn run_read_only<T, F>(&self, op: F) -> Result<T, DomainError>
    where
        F: for<'c> FnOnce(&'c mut PgConnection) -> BoxFuture<'c, Result<T, DomainError>> + Send,
        T: Send,
    {
        let mut tx = self.pool.begin().await?;
        let result = op(&mut tx).await;
        tx.rollback().await?;
        result
    }
}

// Atomicity and rollback behavior are exercised against a live database in
// tests/board_ops_tests.rs.
