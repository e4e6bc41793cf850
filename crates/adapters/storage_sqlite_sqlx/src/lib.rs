//! # meterhub-adapter-storage-sqlite-sqlx
//!
//! `SQLite` persistence adapter using [sqlx](https://docs.rs/sqlx).
//!
//! ## Responsibilities
//! - Implement the repository port traits defined in `meterhub-app::ports::storage`
//! - Manage the process-wide `SQLite` connection pool
//! - Create the schema (sqlx embedded migrations, including the
//!   `groups_deep_children` recursive view)
//! - Map between domain types and database rows, and between sqlx errors and
//!   the domain error taxonomy
//!
//! ## Dependency rule
//! Depends on `meterhub-app` (for port traits) and `meterhub-domain` (for domain types).
//! The `app` and `domain` crates must never reference this adapter.

mod baseline_repo;
mod error;
mod group_repo;
mod pool;
mod timestamp;

pub use baseline_repo::SqliteBaselineRepository;
pub use error::StorageError;
pub use group_repo::SqliteGroupRepository;
pub use pool::{Config, Database};
