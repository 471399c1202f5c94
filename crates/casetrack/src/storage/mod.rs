//! Storage layer for casetrack.
//!
//! This module provides `SQLite`-based persistent storage for cases, the
//! victims, evidence and suspects attached to them, user accounts, sign-in
//! sessions and the audit log.

mod audit;
mod cases;
pub mod migrations;
mod records;
pub mod schema;
mod users;

use std::path::{Path, PathBuf};
use std::str::FromStr;

use chrono::{DateTime, SecondsFormat, Utc};
use rusqlite::Connection;
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::error::{Error, Result};

/// Storage engine for case records.
///
/// Provides persistent storage using `SQLite` with support for:
/// - CRUD on cases and the records attached to them
/// - Cascading deletes from a case to its victims, evidence and suspects
/// - User accounts, credentials and sessions
/// - An append-only audit log
#[derive(Debug)]
pub struct Storage {
    /// Path to the database file.
    path: PathBuf,
    /// Database connection.
    conn: Connection,
}

impl Storage {
    /// Open or create a storage database at the given path.
    ///
    /// Creates the parent directories and database file if they don't exist.
    /// Initializes the schema if this is a new database.
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be opened or schema initialization fails.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();

        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                std::fs::create_dir_all(parent).map_err(|source| Error::DirectoryCreate {
                    path: parent.to_path_buf(),
                    source,
                })?;
            }
        }

        debug!("Opening database at {}", path.display());
        let conn = Connection::open(&path).map_err(|source| Error::DatabaseOpen {
            path: path.clone(),
            source,
        })?;

        conn.execute_batch(
            "PRAGMA journal_mode=WAL; PRAGMA synchronous=NORMAL; PRAGMA foreign_keys=ON;",
        )?;
        migrations::initialize_schema(&conn)?;

        info!("Database opened successfully at {}", path.display());
        Ok(Self { path, conn })
    }

    /// Create an in-memory storage instance for testing.
    ///
    /// # Errors
    ///
    /// Returns an error if the in-memory database cannot be created.
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory().map_err(|source| Error::DatabaseOpen {
            path: PathBuf::from(":memory:"),
            source,
        })?;

        conn.execute_batch("PRAGMA foreign_keys=ON;")?;
        migrations::initialize_schema(&conn)?;

        Ok(Self {
            path: PathBuf::from(":memory:"),
            conn,
        })
    }

    /// Get the path to the database file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Count the records behind the dashboard.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn counts(&self) -> Result<RecordCounts> {
        let count = |sql: &str| -> Result<u64> {
            let n: i64 = self.conn.query_row(sql, [], |row| row.get(0))?;
            Ok(u64::try_from(n).unwrap_or(0))
        };

        Ok(RecordCounts {
            cases: count("SELECT COUNT(*) FROM cases")?,
            open_cases: count("SELECT COUNT(*) FROM cases WHERE status IN ('open', 'in_progress')")?,
            closed_cases: count("SELECT COUNT(*) FROM cases WHERE status IN ('closed', 'archived')")?,
            high_priority_cases: count(
                "SELECT COUNT(*) FROM cases WHERE priority IN ('high', 'critical')",
            )?,
            victims: count("SELECT COUNT(*) FROM victims")?,
            evidence: count("SELECT COUNT(*) FROM evidence")?,
            suspects: count("SELECT COUNT(*) FROM suspects")?,
            users: count("SELECT COUNT(*) FROM users")?,
        })
    }
}

/// Record totals.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct RecordCounts {
    /// All cases.
    pub cases: u64,
    /// Cases that are open or in progress.
    pub open_cases: u64,
    /// Cases that are closed or archived.
    pub closed_cases: u64,
    /// Cases with high or critical priority.
    pub high_priority_cases: u64,
    /// All victims.
    pub victims: u64,
    /// All evidence items.
    pub evidence: u64,
    /// All suspects.
    pub suspects: u64,
    /// All user accounts.
    pub users: u64,
}

/// Format a timestamp for storage. Fixed precision keeps text ordering
/// identical to time ordering.
fn to_db_time(dt: &DateTime<Utc>) -> String {
    dt.to_rfc3339_opts(SecondsFormat::Micros, true)
}

fn from_db_time(value: &str) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(value).map_or_else(
        |_| {
            warn!("Invalid stored timestamp: {}, using now", value);
            Utc::now()
        },
        |dt| dt.with_timezone(&Utc),
    )
}

fn parse_enum<T>(value: &str, column: &str) -> T
where
    T: FromStr<Err = Error> + Default,
{
    value.parse().unwrap_or_else(|_| {
        warn!("Unknown {}: {}, using default", column, value);
        T::default()
    })
}

fn limit_param(limit: Option<usize>) -> i64 {
    // SQLite treats a negative LIMIT as unbounded.
    limit.map_or(-1, |n| i64::try_from(n).unwrap_or(i64::MAX))
}

fn has_extended_code(err: &rusqlite::Error, code: std::os::raw::c_int) -> bool {
    matches!(err, rusqlite::Error::SqliteFailure(e, _) if e.extended_code == code)
}

fn is_unique_violation(err: &rusqlite::Error) -> bool {
    has_extended_code(err, rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE)
        || has_extended_code(err, rusqlite::ffi::SQLITE_CONSTRAINT_PRIMARYKEY)
}

fn is_foreign_key_violation(err: &rusqlite::Error) -> bool {
    has_extended_code(err, rusqlite::ffi::SQLITE_CONSTRAINT_FOREIGNKEY)
}
