//! Storage-specific error type wrapping sqlx errors.

use meterhub_domain::error::{ConflictError, MeterHubError};

/// Errors originating from the `SQLite` storage layer.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    /// A query or connection failed.
    #[error("database error")]
    Database(#[from] sqlx::Error),

    /// Failed to run migrations.
    #[error("migration error")]
    Migration(#[from] sqlx::migrate::MigrateError),
}

impl From<StorageError> for MeterHubError {
    fn from(err: StorageError) -> Self {
        match err {
            StorageError::Migration(_) => Self::Schema(Box::new(err)),
            StorageError::Database(_) => Self::Storage(Box::new(err)),
        }
    }
}

pub(crate) fn is_unique_violation(err: &sqlx::Error) -> bool {
    matches!(err, sqlx::Error::Database(db_err) if db_err.is_unique_violation())
}

pub(crate) fn is_foreign_key_violation(err: &sqlx::Error) -> bool {
    matches!(err, sqlx::Error::Database(db_err) if db_err.is_foreign_key_violation())
}

/// Map a failed write, turning unique violations into the given conflict.
pub(crate) fn write_error(
    err: sqlx::Error,
    conflict: impl FnOnce() -> ConflictError,
) -> MeterHubError {
    if is_unique_violation(&err) {
        conflict().into()
    } else {
        StorageError::from(err).into()
    }
}
