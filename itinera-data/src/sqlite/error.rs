use std::io;

use camino::Utf8PathBuf;
use itinera_core::{EnvironmentError, PoiError, TimeFormatError};
use rusqlite::Error as SqliteError;
use thiserror::Error;

/// Errors raised by [`super::SqliteEnvironment`].
#[derive(Debug, Error)]
pub enum SqliteEnvironmentError {
    /// The directory for the database file could not be created.
    #[error("failed to create parent directory for {path}")]
    CreateDirectory {
        /// Database path.
        path: Utf8PathBuf,
        /// Underlying I/O error.
        #[source]
        source: io::Error,
    },
    /// Opening the database failed.
    #[error("failed to open SQLite database at {path}")]
    Open {
        /// Database path.
        path: Utf8PathBuf,
        /// Source error returned by `rusqlite`.
        #[source]
        source: SqliteError,
    },
    /// A schema step failed.
    #[error("failed to execute migration step '{step}'")]
    Migration {
        /// Step being applied.
        step: &'static str,
        /// Source error returned by `rusqlite`.
        #[source]
        source: SqliteError,
    },
    /// The database was created by an incompatible release.
    #[error(
        "expected environment schema version {expected} but found {found}; rebuild the database"
    )]
    VersionMismatch {
        /// Version this build understands.
        expected: i64,
        /// Version recorded in the database.
        found: i64,
    },
    /// A query or write failed.
    #[error("SQLite operation '{operation}' failed")]
    Sqlite {
        /// What was being attempted.
        operation: &'static str,
        /// Source error returned by `rusqlite`.
        #[source]
        source: SqliteError,
    },
    /// A stored clock time did not parse.
    #[error("{table} row {name:?} holds an invalid clock time")]
    InvalidTime {
        /// Table holding the row.
        table: &'static str,
        /// Row name or identifier.
        name: String,
        /// Parser error.
        #[source]
        source: TimeFormatError,
    },
    /// A stored row failed domain validation.
    #[error("{table} row is invalid")]
    InvalidRow {
        /// Table holding the row.
        table: &'static str,
        /// Validation error.
        #[source]
        source: PoiError,
    },
    /// A timetable row names an unknown transport mode.
    #[error("timetable row {id} has unknown mode {mode:?}")]
    UnknownMode {
        /// Service identifier.
        id: String,
        /// Stored mode text.
        mode: String,
    },
}

impl From<SqliteEnvironmentError> for EnvironmentError {
    fn from(error: SqliteEnvironmentError) -> Self {
        Self::backend("SQLite environment", error)
    }
}
