//! Free-text read-only queries.

use std::time::Instant;

use futures::TryStreamExt;
use serde_json::Value;
use sqlx::sqlite::SqliteRow;
use sqlx::{Column, Executor, Row, TypeInfo, ValueRef};
use tracing::{info, warn};

use crate::error::Result;
use crate::sql_guard::validate_read_only;
use crate::types::{ColumnInfo, QueryOutput};
use crate::RosterDb;

impl RosterDb {
    /// Run a guarded SELECT against the read-only pool.
    ///
    /// At most `max_rows` rows are returned; `truncated` reports whether more
    /// were available. The query text is executed exactly as given.
    pub async fn safe_query(&self, sql: &str, max_rows: usize) -> Result<QueryOutput> {
        if let Err(err) = validate_read_only(sql) {
            warn!(reason = err.reason(), "Rejected query: {}", err);
            return Err(err.into());
        }

        let start = Instant::now();

        // Read one row past the cap to learn whether anything was cut, then
        // drop the stream so the statement stops stepping.
        let mut rows = Vec::new();
        {
            let mut stream = sqlx::query(sql).persistent(false).fetch(&self.read_pool);
            while rows.len() <= max_rows {
                match stream.try_next().await? {
                    Some(row) => rows.push(row),
                    None => break,
                }
            }
        }

        let columns = match rows.first() {
            Some(row) => row
                .columns()
                .iter()
                .map(|col| ColumnInfo {
                    name: col.name().to_string(),
                    data_type: col.type_info().name().to_string(),
                })
                .collect(),
            None => self.describe_columns(sql).await?,
        };

        let truncated = rows.len() > max_rows;
        rows.truncate(max_rows);

        let rows = rows
            .iter()
            .map(row_to_json)
            .collect::<Result<Vec<_>>>()?;

        let elapsed_ms = start.elapsed().as_millis() as u64;
        info!(rows = rows.len(), truncated, elapsed_ms, "Executed safe query");

        Ok(QueryOutput {
            columns,
            row_count: rows.len(),
            rows,
            truncated,
            elapsed_ms,
        })
    }

    /// Column names for a statement that produced no rows.
    async fn describe_columns(&self, sql: &str) -> Result<Vec<ColumnInfo>> {
        let description = self.read_pool.describe(sql).await?;
        Ok(description
            .columns()
            .iter()
            .map(|col| ColumnInfo {
                name: col.name().to_string(),
                data_type: col.type_info().name().to_string(),
            })
            .collect())
    }
}

fn row_to_json(row: &SqliteRow) -> Result<Vec<Value>> {
    (0..row.len()).map(|index| cell_to_json(row, index)).collect()
}

/// INTEGER and REAL become numbers, TEXT a string, BLOB a hex string.
fn cell_to_json(row: &SqliteRow, index: usize) -> Result<Value> {
    let raw = row.try_get_raw(index)?;
    if raw.is_null() {
        return Ok(Value::Null);
    }

    let type_name = raw.type_info().name().to_ascii_uppercase();
    let value = match type_name.as_str() {
        "INTEGER" => Value::from(row.try_get::<i64, _>(index)?),
        "REAL" => Value::from(row.try_get::<f64, _>(index)?),
        "BLOB" => Value::String(hex::encode(row.try_get::<Vec<u8>, _>(index)?)),
        _ => row
            .try_get::<String, _>(index)
            .map(Value::String)
            .or_else(|_| row.try_get::<i64, _>(index).map(Value::from))
            .or_else(|_| row.try_get::<f64, _>(index).map(Value::from))?,
    };
    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{DbError, NewDepartment, NewEmployee, SqlGuardError};
    use tempfile::TempDir;

    async fn seeded_db() -> (TempDir, RosterDb) {
        let tmp = TempDir::new().unwrap();
        let db = RosterDb::open(tmp.path().join("roster.sqlite3")).await.unwrap();
        let eng = db.create_department(&NewDepartment::new("Engineering")).await.unwrap();
        db.create_employee(&NewEmployee::new("Ada").with_department(eng.id).with_salary(120.5))
            .await
            .unwrap();
        db.create_employee(&NewEmployee::new("Grace")).await.unwrap();
        (tmp, db)
    }

    #[tokio::test]
    async fn test_safe_query_returns_typed_cells() {
        let (_tmp, db) = seeded_db().await;

        let out = db
            .safe_query("SELECT id, name, salary FROM employees ORDER BY id", 100)
            .await
            .unwrap();

        let names: Vec<_> = out.columns.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["id", "name", "salary"]);
        assert_eq!(out.row_count, 2);
        assert!(!out.truncated);
        assert_eq!(out.rows[0][1], Value::from("Ada"));
        assert_eq!(out.rows[0][2], Value::from(120.5));
        assert_eq!(out.rows[1][2], Value::Null);
        assert!(out.rows[0][0].is_i64());
    }

    #[tokio::test]
    async fn test_safe_query_truncates() {
        let (_tmp, db) = seeded_db().await;

        let out = db.safe_query("SELECT name FROM employees", 1).await.unwrap();
        assert_eq!(out.row_count, 1);
        assert_eq!(out.rows.len(), 1);
        assert!(out.truncated);
    }

    #[tokio::test]
    async fn test_safe_query_stops_reading_at_cap() {
        let (_tmp, db) = seeded_db().await;
        for i in 0..148 {
            db.create_employee(&NewEmployee::new(format!("Bulk {i}")))
                .await
                .unwrap();
        }

        // 150^3 rows; reading them all would take many seconds.
        let start = Instant::now();
        let out = db
            .safe_query(
                "SELECT a.name, b.name, c.name FROM employees a, employees b, employees c",
                1,
            )
            .await
            .unwrap();

        assert_eq!(out.row_count, 1);
        assert!(out.truncated);
        assert!(
            start.elapsed().as_secs() < 5,
            "took {:?}",
            start.elapsed()
        );
    }

    #[tokio::test]
    async fn test_safe_query_exact_cap_is_not_truncated() {
        let (_tmp, db) = seeded_db().await;

        let out = db.safe_query("SELECT name FROM employees", 2).await.unwrap();
        assert_eq!(out.row_count, 2);
        assert!(!out.truncated);
    }

    #[tokio::test]
    async fn test_safe_query_empty_result_keeps_columns() {
        let (_tmp, db) = seeded_db().await;

        let out = db
            .safe_query("SELECT id, name FROM employees WHERE id < 0", 10)
            .await
            .unwrap();
        assert_eq!(out.row_count, 0);
        assert_eq!(out.columns.len(), 2);
        assert_eq!(out.columns[1].name, "name");
    }

    #[tokio::test]
    async fn test_safe_query_blob_as_hex() {
        let (_tmp, db) = seeded_db().await;

        let out = db.safe_query("SELECT x'CAFE' AS raw", 10).await.unwrap();
        assert_eq!(out.rows[0][0], Value::from("cafe"));
    }

    #[tokio::test]
    async fn test_safe_query_rejections_leave_data_intact() {
        let (_tmp, db) = seeded_db().await;

        let result = db.safe_query("DROP TABLE employees", 10).await;
        assert!(matches!(
            result,
            Err(DbError::Rejected(SqlGuardError::UnsafeOperation { .. }))
        ));

        let result = db.safe_query("SELECT 1; DELETE FROM employees", 10).await;
        assert!(matches!(
            result,
            Err(DbError::Rejected(SqlGuardError::StackedQueryRejected))
        ));

        assert_eq!(db.list_employees(None).await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_safe_query_bad_sql_is_storage_error() {
        let (_tmp, db) = seeded_db().await;

        let result = db.safe_query("SELECT * FROM no_such_table", 10).await;
        let err = result.unwrap_err();
        assert_eq!(err.kind(), "StorageError");
    }
}
