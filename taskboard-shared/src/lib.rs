//! # Taskboard Shared Library
//!
//! This crate contains the board consistency engine and everything the API
//! server shares with it:
//!
//! - `models`: Database models and per-entity queries
//! - `db`: Connection pool, migrations, and the transaction coordinator
//! - `ordering`: Position allocation for columns and tasks
//! - `admission`: Column capacity (WIP limit) checks
//! - `guard`: Board membership invariants
//! - `events`: Per-board event fanout for live observers
//! - `ops`: Board operations service orchestrating all of the above
//! - `auth`: Password hashing, JWT tokens, and the board role gate

pub mod admission;
pub mod auth;
pub mod db;
pub mod error;
pub mod events;
pub mod guard;
pub mod models;
pub mod ops;
pub mod ordering;
pub mod pagination;

pub use error::DomainError;

/// Current version of the taskboard shared library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version_is_set() {
        assert!(!VERSION.is_empty());
    }
}
