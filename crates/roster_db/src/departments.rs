//! Department operations.

use tracing::{debug, info};

use crate::error::{DbError, Result};
use crate::types::{Department, NewDepartment};
use crate::RosterDb;

impl RosterDb {
    /// Create a department.
    pub async fn create_department(&self, department: &NewDepartment) -> Result<Department> {
        let name = department.validated_name()?;

        let result = sqlx::query("INSERT INTO departments (name) VALUES (?)")
            .bind(&name)
            .execute(&self.pool)
            .await?;

        let id = result.last_insert_rowid();
        info!(id, name = %name, "Created department");

        Ok(Department { id, name })
    }

    /// Get a department by ID.
    pub async fn get_department(&self, id: i64) -> Result<Department> {
        sqlx::query_as::<_, Department>("SELECT id, name FROM departments WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.read_pool)
            .await?
            .ok_or_else(|| DbError::not_found(format!("department {}", id)))
    }

    /// List all departments, ordered by ID.
    pub async fn list_departments(&self) -> Result<Vec<Department>> {
        let departments =
            sqlx::query_as::<_, Department>("SELECT id, name FROM departments ORDER BY id")
                .fetch_all(&self.read_pool)
                .await?;

        debug!(count = departments.len(), "Listed departments");
        Ok(departments)
    }

    /// Rename a department.
    pub async fn rename_department(&self, id: i64, name: &str) -> Result<Department> {
        let name = NewDepartment::new(name).validated_name()?;

        let result = sqlx::query("UPDATE departments SET name = ? WHERE id = ?")
            .bind(&name)
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found(format!("department {}", id)));
        }

        info!(id, name = %name, "Renamed department");
        Ok(Department { id, name })
    }

    /// Delete a department.
    ///
    /// Refused while any employee still references it. Returns the deleted
    /// record.
    pub async fn delete_department(&self, id: i64) -> Result<Department> {
        let mut tx = self.pool.begin().await?;

        let department =
            sqlx::query_as::<_, Department>("SELECT id, name FROM departments WHERE id = ?")
                .bind(id)
                .fetch_optional(&mut *tx)
                .await?
                .ok_or_else(|| DbError::not_found(format!("department {}", id)))?;

        let members: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM employees WHERE department_id = ?")
                .bind(id)
                .fetch_one(&mut *tx)
                .await?;

        if members > 0 {
            return Err(DbError::constraint(format!(
                "department {} still has {} employee(s); reassign or remove them first",
                id, members
            )));
        }

        sqlx::query("DELETE FROM departments WHERE id = ?")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        info!(id, name = %department.name, "Deleted department");
        Ok(department)
    }

    /// Returns an error unless the department exists.
    pub(crate) async fn ensure_department_exists<'e, E>(executor: E, id: i64) -> Result<()>
    where
        E: sqlx::Executor<'e, Database = sqlx::Sqlite>,
    {
        let found: Option<i64> = sqlx::query_scalar("SELECT id FROM departments WHERE id = ?")
            .bind(id)
            .fetch_optional(executor)
            .await?;

        match found {
            Some(_) => Ok(()),
            None => Err(DbError::validation(format!(
                "department {} does not exist",
                id
            ))),
        }
    }
}
