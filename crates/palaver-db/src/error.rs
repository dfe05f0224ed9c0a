//! Data-layer error type

use thiserror::Error;

/// Errors produced by [`crate::Store`] operations.
#[derive(Error, Debug)]
pub enum DbError {
    /// The row addressed by the operation does not exist.
    #[error("{0} not found")]
    NotFound(&'static str),

    /// A versioned update matched the id but not the version.
    #[error("{0} was modified concurrently")]
    VersionConflict(&'static str),

    /// A unique constraint rejected the write.
    #[error("{resource} with this {field} already exists")]
    Duplicate {
        resource: &'static str,
        field: &'static str,
    },

    /// The row is still referenced and cannot be deleted.
    #[error("{resource} still has {dependents}")]
    Referenced {
        resource: &'static str,
        dependents: &'static str,
    },

    #[error("database error: {0}")]
    Sqlx(#[from] sqlx::Error),

    #[error("migration error: {0}")]
    Migrate(#[from] sqlx::migrate::MigrateError),
}

impl DbError {
    /// Map a sqlx error to [`DbError::Duplicate`] when it is a unique
    /// violation, otherwise pass it through.
    pub(crate) fn on_unique(
        err: sqlx::Error,
        resource: &'static str,
        field: &'static str,
    ) -> Self {
        let unique = err
            .as_database_error()
            .map(|db| db.is_unique_violation())
            .unwrap_or(false);
        if unique {
            Self::Duplicate { resource, field }
        } else {
            Self::Sqlx(err)
        }
    }
}
