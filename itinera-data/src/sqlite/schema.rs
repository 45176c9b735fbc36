//! Schema of the environment database.
#![forbid(unsafe_code)]

use rusqlite::{Connection, OptionalExtension, Transaction};

use super::SqliteEnvironmentError;

/// Schema version written by this build.
pub const SCHEMA_VERSION: i64 = 1;

const TABLES: [(&str, &str); 6] = [
    (
        "create cities",
        "CREATE TABLE IF NOT EXISTS cities (
            name TEXT PRIMARY KEY CHECK (length(trim(name)) > 0)
        ) WITHOUT ROWID",
    ),
    (
        "create stations",
        "CREATE TABLE IF NOT EXISTS stations (
            city TEXT NOT NULL REFERENCES cities(name) ON DELETE CASCADE,
            name TEXT NOT NULL,
            lon REAL NOT NULL,
            lat REAL NOT NULL,
            PRIMARY KEY (city, name)
        )",
    ),
    (
        "create accommodations",
        "CREATE TABLE IF NOT EXISTS accommodations (
            city TEXT NOT NULL REFERENCES cities(name) ON DELETE CASCADE,
            name TEXT NOT NULL,
            price INTEGER NOT NULL CHECK (price >= 0),
            beds_per_room INTEGER NOT NULL CHECK (beds_per_room > 0),
            lon REAL,
            lat REAL,
            PRIMARY KEY (city, name)
        )",
    ),
    (
        "create attractions",
        "CREATE TABLE IF NOT EXISTS attractions (
            city TEXT NOT NULL REFERENCES cities(name) ON DELETE CASCADE,
            name TEXT NOT NULL,
            spot_type TEXT NOT NULL,
            price INTEGER NOT NULL CHECK (price >= 0),
            open TEXT NOT NULL,
            close TEXT NOT NULL,
            visit_minutes INTEGER NOT NULL CHECK (visit_minutes >= 0),
            lon REAL,
            lat REAL,
            PRIMARY KEY (city, name)
        )",
    ),
    (
        "create restaurants",
        "CREATE TABLE IF NOT EXISTS restaurants (
            city TEXT NOT NULL REFERENCES cities(name) ON DELETE CASCADE,
            name TEXT NOT NULL,
            cuisine TEXT NOT NULL,
            price INTEGER NOT NULL CHECK (price >= 0),
            open TEXT NOT NULL,
            close TEXT NOT NULL,
            lon REAL,
            lat REAL,
            PRIMARY KEY (city, name)
        )",
    ),
    (
        "create intercity",
        "CREATE TABLE IF NOT EXISTS intercity (
            id TEXT NOT NULL,
            mode TEXT NOT NULL,
            from_city TEXT NOT NULL REFERENCES cities(name) ON DELETE CASCADE,
            to_city TEXT NOT NULL REFERENCES cities(name) ON DELETE CASCADE,
            from_station TEXT NOT NULL,
            to_station TEXT NOT NULL,
            depart TEXT NOT NULL,
            arrive TEXT NOT NULL,
            cost INTEGER NOT NULL CHECK (cost >= 0),
            PRIMARY KEY (id, from_city, to_city)
        )",
    ),
];

/// Create the environment tables inside `connection` if they are missing
/// and check the recorded schema version.
///
/// # Examples
/// ```
/// use rusqlite::Connection;
/// use itinera_data::sqlite::{SCHEMA_VERSION, initialise_schema};
///
/// let mut conn = Connection::open_in_memory().expect("create in-memory database");
/// initialise_schema(&mut conn).expect("create schema");
/// let version: i64 = conn
///     .query_row("SELECT version FROM itinera_schema_version", [], |row| row.get(0))
///     .expect("read schema version");
/// assert_eq!(version, SCHEMA_VERSION);
/// ```
///
/// # Errors
/// Returns [`SqliteEnvironmentError::Migration`] when a step fails and
/// [`SqliteEnvironmentError::VersionMismatch`] for databases written by an
/// incompatible release.
pub fn initialise_schema(connection: &mut Connection) -> Result<(), SqliteEnvironmentError> {
    connection
        .pragma_update(None, "foreign_keys", true)
        .map_err(|source| SqliteEnvironmentError::Migration {
            step: "enable foreign keys",
            source,
        })?;
    let transaction =
        connection
            .transaction()
            .map_err(|source| SqliteEnvironmentError::Migration {
                step: "begin schema transaction",
                source,
            })?;
    for (step, sql) in TABLES {
        run_migration_step(&transaction, step, sql)?;
    }
    run_migration_step(
        &transaction,
        "index intercity routes",
        "CREATE INDEX IF NOT EXISTS idx_intercity_route
            ON intercity(from_city, to_city, mode)",
    )?;
    ensure_schema_version(&transaction)?;
    transaction
        .commit()
        .map_err(|source| SqliteEnvironmentError::Migration {
            step: "commit schema transaction",
            source,
        })
}

fn ensure_schema_version(transaction: &Transaction<'_>) -> Result<(), SqliteEnvironmentError> {
    run_migration_step(
        transaction,
        "create schema version table",
        "CREATE TABLE IF NOT EXISTS itinera_schema_version (
            version INTEGER PRIMARY KEY CHECK (version > 0)
        ) WITHOUT ROWID",
    )?;
    let recorded: Option<i64> = transaction
        .query_row(
            "SELECT version FROM itinera_schema_version LIMIT 1",
            [],
            |row| row.get(0),
        )
        .optional()
        .map_err(|source| SqliteEnvironmentError::Migration {
            step: "read schema version",
            source,
        })?;
    match recorded {
        Some(version) if version == SCHEMA_VERSION => Ok(()),
        Some(found) => Err(SqliteEnvironmentError::VersionMismatch {
            expected: SCHEMA_VERSION,
            found,
        }),
        None => run_migration_step(
            transaction,
            "record schema version",
            "INSERT INTO itinera_schema_version (version) VALUES (1)",
        ),
    }
}

fn run_migration_step(
    transaction: &Transaction<'_>,
    step: &'static str,
    sql: &str,
) -> Result<(), SqliteEnvironmentError> {
    transaction
        .execute(sql, [])
        .map(|_| ())
        .map_err(|source| SqliteEnvironmentError::Migration { step, source })
}
