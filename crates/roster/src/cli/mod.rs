//! CLI module for Roster
//!
//! Each command opens its own `RosterDb` handle. Only `init` and `mcp` may
//! create a fresh database; everything else requires one to exist already.

pub mod error;
pub mod output;

pub mod config;
pub mod department;
pub mod employee;
pub mod init;
pub mod mcp;
pub mod query;
pub mod stats;

use crate::cli::config::Settings;
use crate::cli::error::HelpfulError;
use roster_db::{DbError, RosterDb};

/// Open the configured database, creating it and its schema if needed.
pub async fn create_db(settings: &Settings) -> anyhow::Result<RosterDb> {
    RosterDb::open(&settings.db_path).await.map_err(|err| {
        HelpfulError::new(format!(
            "Cannot open database: {}",
            settings.db_path.display()
        ))
        .with_context(err.to_string())
        .with_suggestion("TRY: Check that the directory is writable")
        .with_suggestion("TRY: Point at another file with --db or ROSTER_DB")
        .into()
    })
}

/// Open an existing database.
pub async fn open_db(settings: &Settings) -> anyhow::Result<RosterDb> {
    match RosterDb::open_existing(&settings.db_path).await {
        Ok(db) => Ok(db),
        Err(DbError::NotFound(_)) => {
            Err(HelpfulError::database_missing(&settings.db_path).into())
        }
        Err(err) => Err(err.into()),
    }
}
