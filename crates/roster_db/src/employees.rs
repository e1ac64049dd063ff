//! Employee operations.

use tracing::{debug, info};

use crate::error::{DbError, Result};
use crate::types::{Employee, EmployeeFilter, EmployeeStats, EmployeeUpdate, NewEmployee};
use crate::RosterDb;

/// Employees joined with their department name, ready for `Employee`.
const EMPLOYEE_SELECT: &str = r#"
    SELECT e.id, e.name, e.department_id, d.name AS department_name, e.salary, e.hire_date
    FROM employees e
    LEFT JOIN departments d ON d.id = e.department_id
"#;

/// SQLite treats a negative LIMIT as "no limit".
const NO_LIMIT: i64 = -1;

impl RosterDb {
    /// Create an employee.
    ///
    /// A referenced department must already exist.
    pub async fn create_employee(&self, employee: &NewEmployee) -> Result<Employee> {
        let name = employee.validate()?;

        let mut tx = self.pool.begin().await?;

        if let Some(department_id) = employee.department_id {
            Self::ensure_department_exists(&mut *tx, department_id).await?;
        }

        let result = sqlx::query(
            "INSERT INTO employees (name, department_id, salary, hire_date) VALUES (?, ?, ?, ?)",
        )
        .bind(&name)
        .bind(employee.department_id)
        .bind(employee.salary)
        .bind(employee.hire_date)
        .execute(&mut *tx)
        .await?;

        let id = result.last_insert_rowid();
        let created = sqlx::query_as::<_, Employee>(&format!("{EMPLOYEE_SELECT} WHERE e.id = ?"))
            .bind(id)
            .fetch_one(&mut *tx)
            .await?;

        tx.commit().await?;

        info!(id, name = %created.name, "Created employee");
        Ok(created)
    }

    /// Get an employee by ID.
    pub async fn get_employee(&self, id: i64) -> Result<Employee> {
        sqlx::query_as::<_, Employee>(&format!("{EMPLOYEE_SELECT} WHERE e.id = ?"))
            .bind(id)
            .fetch_optional(&self.read_pool)
            .await?
            .ok_or_else(|| DbError::not_found(format!("employee {}", id)))
    }

    /// List employees ordered by ID, at most `limit` of them.
    pub async fn list_employees(&self, limit: Option<u32>) -> Result<Vec<Employee>> {
        let employees =
            sqlx::query_as::<_, Employee>(&format!("{EMPLOYEE_SELECT} ORDER BY e.id LIMIT ?"))
                .bind(limit.map(i64::from).unwrap_or(NO_LIMIT))
                .fetch_all(&self.read_pool)
                .await?;

        debug!(count = employees.len(), "Listed employees");
        Ok(employees)
    }

    /// Search employees by name and/or department name.
    ///
    /// Each term is a case-insensitive substring match. An empty filter
    /// matches everyone.
    pub async fn search_employees(
        &self,
        filter: &EmployeeFilter,
        limit: Option<u32>,
    ) -> Result<Vec<Employee>> {
        let mut sql = format!("{EMPLOYEE_SELECT} WHERE 1 = 1");
        let mut patterns = Vec::new();

        if let Some(term) = filter.name_term() {
            sql.push_str(r" AND e.name LIKE ? ESCAPE '\'");
            patterns.push(like_pattern(term));
        }
        if let Some(term) = filter.department_term() {
            sql.push_str(r" AND d.name LIKE ? ESCAPE '\'");
            patterns.push(like_pattern(term));
        }
        sql.push_str(" ORDER BY e.id LIMIT ?");

        let mut query = sqlx::query_as::<_, Employee>(&sql);
        for pattern in patterns {
            query = query.bind(pattern);
        }

        let employees = query
            .bind(limit.map(i64::from).unwrap_or(NO_LIMIT))
            .fetch_all(&self.read_pool)
            .await?;

        debug!(
            name = ?filter.name_term(),
            department = ?filter.department_term(),
            count = employees.len(),
            "Searched employees"
        );
        Ok(employees)
    }

    /// Apply a partial update and return the stored record.
    pub async fn update_employee(&self, id: i64, update: &EmployeeUpdate) -> Result<Employee> {
        let new_name = update.validate()?;

        let mut tx = self.pool.begin().await?;

        let current = sqlx::query_as::<_, Employee>(&format!("{EMPLOYEE_SELECT} WHERE e.id = ?"))
            .bind(id)
            .fetch_optional(&mut *tx)
            .await?
            .ok_or_else(|| DbError::not_found(format!("employee {}", id)))?;

        if update.is_empty() {
            return Ok(current);
        }

        let department_id = update.department_id.unwrap_or(current.department_id);
        if let Some(department_id) = department_id {
            if Some(department_id) != current.department_id {
                Self::ensure_department_exists(&mut *tx, department_id).await?;
            }
        }

        let name = new_name.unwrap_or(current.name);
        let salary = update.salary.unwrap_or(current.salary);
        let hire_date = update.hire_date.unwrap_or(current.hire_date);

        sqlx::query(
            "UPDATE employees SET name = ?, department_id = ?, salary = ?, hire_date = ? WHERE id = ?",
        )
        .bind(&name)
        .bind(department_id)
        .bind(salary)
        .bind(hire_date)
        .bind(id)
        .execute(&mut *tx)
        .await?;

        let updated = sqlx::query_as::<_, Employee>(&format!("{EMPLOYEE_SELECT} WHERE e.id = ?"))
            .bind(id)
            .fetch_one(&mut *tx)
            .await?;

        tx.commit().await?;

        info!(id, "Updated employee");
        Ok(updated)
    }

    /// Delete an employee, returning the removed record.
    pub async fn delete_employee(&self, id: i64) -> Result<Employee> {
        let mut tx = self.pool.begin().await?;

        let employee = sqlx::query_as::<_, Employee>(&format!("{EMPLOYEE_SELECT} WHERE e.id = ?"))
            .bind(id)
            .fetch_optional(&mut *tx)
            .await?
            .ok_or_else(|| DbError::not_found(format!("employee {}", id)))?;

        sqlx::query("DELETE FROM employees WHERE id = ?")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        info!(id, name = %employee.name, "Deleted employee");
        Ok(employee)
    }

    /// Headcount and salary aggregates, optionally for one department.
    ///
    /// An unknown department yields a zero count, not an error.
    pub async fn employee_stats(&self, department_id: Option<i64>) -> Result<EmployeeStats> {
        let stats = sqlx::query_as::<_, EmployeeStats>(
            r#"
            SELECT
                COUNT(*) AS count,
                AVG(salary) AS average_salary,
                MIN(salary) AS min_salary,
                MAX(salary) AS max_salary
            FROM employees
            WHERE ? IS NULL OR department_id = ?
            "#,
        )
        .bind(department_id)
        .bind(department_id)
        .fetch_one(&self.read_pool)
        .await?;

        debug!(?department_id, count = stats.count, "Computed employee stats");
        Ok(stats)
    }
}

/// Wrap a search term for `LIKE ... ESCAPE '\'`, matching it literally.
fn like_pattern(term: &str) -> String {
    let mut pattern = String::with_capacity(term.len() + 2);
    pattern.push('%');
    for ch in term.chars() {
        if matches!(ch, '%' | '_' | '\\') {
            pattern.push('\\');
        }
        pattern.push(ch);
    }
    pattern.push('%');
    pattern
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::NewDepartment;
    use chrono::NaiveDate;
    use tempfile::TempDir;

    async fn open_db() -> (TempDir, RosterDb) {
        let tmp = TempDir::new().unwrap();
        let db = RosterDb::open(tmp.path().join("roster.sqlite3")).await.unwrap();
        (tmp, db)
    }

    #[test]
    fn test_like_pattern_escapes_wildcards() {
        assert_eq!(like_pattern("john"), "%john%");
        assert_eq!(like_pattern("50%"), "%50\\%%");
        assert_eq!(like_pattern("a_b"), "%a\\_b%");
        assert_eq!(like_pattern("c:\\"), "%c:\\\\%");
    }

    #[tokio::test]
    async fn test_create_and_get_employee() {
        let (_tmp, db) = open_db().await;
        let dept = db.create_department(&NewDepartment::new("Engineering")).await.unwrap();
        let hired = NaiveDate::from_ymd_opt(2021, 3, 15).unwrap();

        let created = db
            .create_employee(
                &NewEmployee::new(" Ada Lovelace ")
                    .with_department(dept.id)
                    .with_salary(120_000.0)
                    .with_hire_date(hired),
            )
            .await
            .unwrap();

        assert_eq!(created.name, "Ada Lovelace");
        assert_eq!(created.department_name.as_deref(), Some("Engineering"));
        assert_eq!(created.hire_date, Some(hired));

        let fetched = db.get_employee(created.id).await.unwrap();
        assert_eq!(fetched, created);
    }

    #[tokio::test]
    async fn test_create_employee_unknown_department() {
        let (_tmp, db) = open_db().await;

        let result = db
            .create_employee(&NewEmployee::new("Ghost").with_department(77))
            .await;
        assert!(matches!(result, Err(DbError::Validation(_))));
        assert!(db.list_employees(None).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_list_employees_respects_limit() {
        let (_tmp, db) = open_db().await;
        for name in ["A", "B", "C"] {
            db.create_employee(&NewEmployee::new(name)).await.unwrap();
        }

        assert_eq!(db.list_employees(None).await.unwrap().len(), 3);
        let limited = db.list_employees(Some(2)).await.unwrap();
        assert_eq!(limited.len(), 2);
        assert_eq!(limited[0].name, "A");
        assert!(db.list_employees(Some(0)).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_update_employee_partial() {
        let (_tmp, db) = open_db().await;
        let dept = db.create_department(&NewDepartment::new("Ops")).await.unwrap();
        let emp = db
            .create_employee(&NewEmployee::new("Ada").with_salary(100.0).with_department(dept.id))
            .await
            .unwrap();

        let update = EmployeeUpdate {
            salary: Some(Some(150.0)),
            ..EmployeeUpdate::default()
        };
        let updated = db.update_employee(emp.id, &update).await.unwrap();
        assert_eq!(updated.salary, Some(150.0));
        assert_eq!(updated.name, "Ada");
        assert_eq!(updated.department_id, Some(dept.id));

        let clear = EmployeeUpdate {
            department_id: Some(None),
            ..EmployeeUpdate::default()
        };
        let cleared = db.update_employee(emp.id, &clear).await.unwrap();
        assert_eq!(cleared.department_id, None);
        assert_eq!(cleared.department_name, None);
        assert_eq!(cleared.salary, Some(150.0));
    }

    #[tokio::test]
    async fn test_update_employee_errors() {
        let (_tmp, db) = open_db().await;
        let emp = db.create_employee(&NewEmployee::new("Ada")).await.unwrap();

        let rename = EmployeeUpdate {
            name: Some("Grace".into()),
            ..EmployeeUpdate::default()
        };
        assert!(matches!(
            db.update_employee(999, &rename).await,
            Err(DbError::NotFound(_))
        ));

        let bad_dept = EmployeeUpdate {
            department_id: Some(Some(404)),
            ..EmployeeUpdate::default()
        };
        assert!(matches!(
            db.update_employee(emp.id, &bad_dept).await,
            Err(DbError::Validation(_))
        ));
        assert_eq!(db.get_employee(emp.id).await.unwrap().department_id, None);
    }

    #[tokio::test]
    async fn test_delete_employee() {
        let (_tmp, db) = open_db().await;
        let emp = db.create_employee(&NewEmployee::new("Ada")).await.unwrap();

        let deleted = db.delete_employee(emp.id).await.unwrap();
        assert_eq!(deleted, emp);
        assert!(matches!(db.get_employee(emp.id).await, Err(DbError::NotFound(_))));
        assert!(matches!(db.delete_employee(emp.id).await, Err(DbError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_search_employees() {
        let (_tmp, db) = open_db().await;
        let eng = db.create_department(&NewDepartment::new("Engineering")).await.unwrap();
        let sales = db.create_department(&NewDepartment::new("Sales")).await.unwrap();
        db.create_employee(&NewEmployee::new("John Doe").with_department(eng.id))
            .await
            .unwrap();
        db.create_employee(&NewEmployee::new("johnny").with_department(sales.id))
            .await
            .unwrap();
        db.create_employee(&NewEmployee::new("Jane 100%")).await.unwrap();

        let by_name = EmployeeFilter {
            name: Some("john".into()),
            department: None,
        };
        let found = db.search_employees(&by_name, None).await.unwrap();
        let names: Vec<_> = found.iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, vec!["John Doe", "johnny"]);

        let both = EmployeeFilter {
            name: Some("JOHN".into()),
            department: Some("sales".into()),
        };
        let found = db.search_employees(&both, None).await.unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].name, "johnny");

        let literal = EmployeeFilter {
            name: Some("%".into()),
            department: None,
        };
        let found = db.search_employees(&literal, None).await.unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].name, "Jane 100%");

        let everyone = db.search_employees(&EmployeeFilter::default(), None).await.unwrap();
        assert_eq!(everyone.len(), 3);
        let capped = db.search_employees(&EmployeeFilter::default(), Some(1)).await.unwrap();
        assert_eq!(capped.len(), 1);
    }

    #[tokio::test]
    async fn test_employee_stats() {
        let (_tmp, db) = open_db().await;

        let empty = db.employee_stats(None).await.unwrap();
        assert_eq!(empty.count, 0);
        assert_eq!(empty.average_salary, None);
        assert_eq!(empty.min_salary, None);

        let eng = db.create_department(&NewDepartment::new("Engineering")).await.unwrap();
        db.create_employee(&NewEmployee::new("A").with_department(eng.id).with_salary(100.0))
            .await
            .unwrap();
        db.create_employee(&NewEmployee::new("B").with_department(eng.id).with_salary(300.0))
            .await
            .unwrap();
        db.create_employee(&NewEmployee::new("C").with_salary(50.0))
            .await
            .unwrap();
        db.create_employee(&NewEmployee::new("D")).await.unwrap();

        let all = db.employee_stats(None).await.unwrap();
        assert_eq!(all.count, 4);
        assert_eq!(all.average_salary, Some(150.0));
        assert_eq!(all.min_salary, Some(50.0));
        assert_eq!(all.max_salary, Some(300.0));

        let eng_stats = db.employee_stats(Some(eng.id)).await.unwrap();
        assert_eq!(eng_stats.count, 2);
        assert_eq!(eng_stats.average_salary, Some(200.0));

        let unknown = db.employee_stats(Some(999)).await.unwrap();
        assert_eq!(unknown.count, 0);
        assert_eq!(unknown.max_salary, None);
    }
}
