//! Record store for Roster
//!
//! This crate owns the employee/department database and the read-only query
//! guard. The CLI and the MCP server both go through [`RosterDb`]; nothing else
//! talks to SQLite directly.
//!
//! # Usage
//!
//! ```rust,ignore
//! use roster_db::{NewDepartment, NewEmployee, RosterDb, Result};
//!
//! let db = RosterDb::open("~/.roster/roster.sqlite3").await?;
//!
//! let sales = db.create_department(&NewDepartment::new("Sales")).await?;
//! let ada = db
//!     .create_employee(&NewEmployee::new("Ada").with_department(sales.id))
//!     .await?;
//!
//! let rows = db.safe_query("SELECT name FROM employees", 100).await?;
//! ```
//!
//! # Pools
//!
//! Two pools point at the same file. Mutations use the read-write pool; every
//! read (list, get, search, stats, safe queries) uses a pool opened with
//! `SQLITE_OPEN_READONLY`, so a query that gets past [`sql_guard`] still
//! cannot write.

mod error;
mod schema;
mod types;

// Method implementations organized by entity
mod departments;
mod employees;
mod query;

pub mod sql_guard;

pub use error::{DbError, Result};
pub use sql_guard::{validate_read_only, SqlGuardError};
pub use types::*;

use sqlx::sqlite::{
    SqliteConnectOptions, SqliteJournalMode, SqlitePool, SqlitePoolOptions, SqliteSynchronous,
};
use std::path::Path;
use tracing::info;

const MAX_WRITE_CONNECTIONS: u32 = 1;
const MAX_READ_CONNECTIONS: u32 = 4;

/// Handle to the Roster database.
///
/// Cheap to clone; clones share both pools.
#[derive(Clone)]
pub struct RosterDb {
    pool: SqlitePool,
    read_pool: SqlitePool,
}

impl RosterDb {
    /// Open or create a database at the given path.
    ///
    /// Creates all tables if they don't exist.
    pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();

        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let db = Self::connect(path, true).await?;
        db.ensure_schema().await?;

        info!(path = %path.display(), "Database opened");

        Ok(db)
    }

    /// Open an existing database (fails if not exists).
    pub async fn open_existing(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();

        if !path.exists() {
            return Err(DbError::NotFound(format!(
                "Database not found: {}",
                path.display()
            )));
        }

        let db = Self::connect(path, false).await?;
        db.ensure_schema().await?;

        info!(path = %path.display(), "Database opened (existing)");

        Ok(db)
    }

    async fn connect(path: &Path, create: bool) -> Result<Self> {
        let write_options = SqliteConnectOptions::new()
            .filename(path)
            .create_if_missing(create)
            .foreign_keys(true)
            .journal_mode(SqliteJournalMode::Wal)
            .synchronous(SqliteSynchronous::Normal);

        let pool = SqlitePoolOptions::new()
            .max_connections(MAX_WRITE_CONNECTIONS)
            .connect_with(write_options)
            .await?;

        // Journal mode is persistent in the file, so read-only connections
        // must not try to change it.
        let read_options = SqliteConnectOptions::new()
            .filename(path)
            .read_only(true)
            .foreign_keys(true);

        let read_pool = SqlitePoolOptions::new()
            .max_connections(MAX_READ_CONNECTIONS)
            .connect_with(read_options)
            .await?;

        Ok(Self { pool, read_pool })
    }

    /// Read-write pool (escape hatch for tests and maintenance).
    ///
    /// Prefer using the typed methods instead.
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Read-only pool used by every read path.
    pub fn read_pool(&self) -> &SqlitePool {
        &self.read_pool
    }

    /// Close both pools.
    pub async fn close(self) {
        self.read_pool.close().await;
        self.pool.close().await;
    }
}
