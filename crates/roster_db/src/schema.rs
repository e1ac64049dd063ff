//! Database schema creation.
//!
//! All CREATE TABLE statements live here - single source of truth.

use crate::error::Result;
use crate::RosterDb;
use tracing::info;

impl RosterDb {
    /// Ensure all tables exist.
    pub(crate) async fn ensure_schema(&self) -> Result<()> {
        sqlx::query(
            r#"CREATE TABLE IF NOT EXISTS departments (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                name TEXT NOT NULL
            )"#,
        )
        .execute(&self.pool)
        .await?;

        // Deleting a department that still has employees is refused.
        sqlx::query(
            r#"CREATE TABLE IF NOT EXISTS employees (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                name TEXT NOT NULL,
                department_id INTEGER REFERENCES departments(id) ON DELETE RESTRICT,
                salary REAL,
                hire_date TEXT
            )"#,
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            "CREATE INDEX IF NOT EXISTS idx_employees_department ON employees(department_id)",
        )
        .execute(&self.pool)
        .await?;

        info!("Database schema verified");
        Ok(())
    }
}
