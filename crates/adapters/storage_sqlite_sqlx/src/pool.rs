//! `SQLite` connection pool setup and schema creation.

use std::str::FromStr;
use std::time::Duration;

use sqlx::migrate::Migrator;
use sqlx::{Sqlite, SqlitePool, Transaction};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};

use meterhub_domain::error::MeterHubError;

use crate::error::StorageError;

static MIGRATOR: Migrator = sqlx::migrate!("./migrations");

/// Configuration for the `SQLite` storage adapter.
#[derive(Debug, Clone)]
pub struct Config {
    /// `SQLite` connection URL (e.g. `sqlite:meterhub.db` or `sqlite::memory:`).
    pub database_url: String,
    /// Upper bound on pooled connections.
    pub max_connections: u32,
    /// How long a caller waits for a free connection before failing.
    pub acquire_timeout: Duration,
}

impl Config {
    /// Configuration with default pool limits for the given URL.
    #[must_use]
    pub fn new(database_url: impl Into<String>) -> Self {
        Self {
            database_url: database_url.into(),
            max_connections: 5,
            acquire_timeout: Duration::from_secs(5),
        }
    }

    /// Build a [`Database`] from this configuration.
    ///
    /// Creates the connection pool, creates the database file if missing,
    /// and brings the schema up to date.
    ///
    /// # Errors
    ///
    /// Returns [`MeterHubError::Storage`] if the connection fails and
    /// [`MeterHubError::Schema`] if creating the schema fails.
    pub async fn build(self) -> Result<Database, MeterHubError> {
        Database::initialize(&self).await
    }
}

/// Start a transaction that takes the write lock with its first statement.
///
/// A deferred transaction that reads before writing cannot upgrade its lock
/// once another connection has committed, and fails with `SQLITE_BUSY`
/// instead of waiting. Check-then-write sequences go through here.
pub(crate) async fn begin_write(
    pool: &SqlitePool,
) -> Result<Transaction<'static, Sqlite>, MeterHubError> {
    pool.begin_with("BEGIN IMMEDIATE")
        .await
        .map_err(|err| StorageError::from(err).into())
}

/// File-backed database inside `dir`. The directory also collects the
/// `-wal` and `-shm` files, so dropping it removes everything.
#[cfg(test)]
pub(crate) async fn file_database(dir: &tempfile::TempDir) -> Database {
    let path = dir.path().join("meterhub.db");
    Config::new(format!("sqlite://{}", path.display()))
        .build()
        .await
        .unwrap()
}

/// Holds the `SQLite` connection pool and provides access to it.
pub struct Database {
    pool: SqlitePool,
}

impl Database {
    async fn initialize(config: &Config) -> Result<Self, MeterHubError> {
        let options = SqliteConnectOptions::from_str(&config.database_url)
            .map_err(StorageError::from)?
            .create_if_missing(true);

        let pool = SqlitePoolOptions::new()
            .max_connections(config.max_connections)
            .acquire_timeout(config.acquire_timeout)
            .connect_with(options)
            .await
            .map_err(StorageError::from)?;

        let db = Self { pool };
        db.create_schema().await?;
        Ok(db)
    }

    /// Ensure every table, index, and view exists. Safe to call repeatedly.
    ///
    /// # Errors
    ///
    /// Returns [`MeterHubError::Schema`] when a DDL statement fails.
    pub async fn create_schema(&self) -> Result<(), MeterHubError> {
        MIGRATOR.run(&self.pool).await.map_err(StorageError::from)?;
        tracing::debug!("database schema is up to date");
        Ok(())
    }

    /// Borrow the underlying connection pool.
    #[must_use]
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Close every pooled connection, waiting for checked-out ones to return.
    pub async fn close(&self) {
        self.pool.close().await;
    }
}
