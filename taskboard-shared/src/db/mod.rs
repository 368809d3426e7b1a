/// Database layer
///
/// - `pool`: PostgreSQL connection pool construction and health checks
/// - `migrations`: embedded schema migrations
/// - `unit_of_work`: the transaction coordinator every board operation runs in

pub mod migrations;
pub mod pool;
pub mod unit_of_work;

pub use pool::{create_pool, health_check, DatabaseConfig};
pub use unit_of_work::TxCoordinator;
