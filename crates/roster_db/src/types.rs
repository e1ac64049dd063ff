//! Typed records for the employee and department tables.
//!
//! Rows are read straight into these structs with `sqlx::FromRow`; the
//! `New*`/`*Update` types carry caller input and know how to validate it.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::{DbError, Result};

/// Longest accepted name, in characters.
pub const MAX_NAME_LEN: usize = 100;

/// Date format used for `hire_date` on the wire and in the database.
pub const HIRE_DATE_FORMAT: &str = "%Y-%m-%d";

// ============================================================================
// Departments
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Department {
    pub id: i64,
    pub name: String,
}

/// Input for creating a department.
#[derive(Debug, Clone, Deserialize)]
pub struct NewDepartment {
    pub name: String,
}

impl NewDepartment {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }

    pub(crate) fn validated_name(&self) -> Result<String> {
        validate_name("department", &self.name)
    }
}

// ============================================================================
// Employees
// ============================================================================

/// An employee joined with the name of their department.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Employee {
    pub id: i64,
    pub name: String,
    pub department_id: Option<i64>,
    pub department_name: Option<String>,
    pub salary: Option<f64>,
    pub hire_date: Option<NaiveDate>,
}

/// Input for creating an employee.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct NewEmployee {
    pub name: String,
    #[serde(default)]
    pub department_id: Option<i64>,
    #[serde(default)]
    pub salary: Option<f64>,
    #[serde(default)]
    pub hire_date: Option<NaiveDate>,
}

impl NewEmployee {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn with_department(mut self, department_id: i64) -> Self {
        self.department_id = Some(department_id);
        self
    }

    pub fn with_salary(mut self, salary: f64) -> Self {
        self.salary = Some(salary);
        self
    }

    pub fn with_hire_date(mut self, hire_date: NaiveDate) -> Self {
        self.hire_date = Some(hire_date);
        self
    }

    /// Returns the trimmed name to store.
    pub(crate) fn validate(&self) -> Result<String> {
        let name = validate_name("employee", &self.name)?;
        validate_salary(self.salary)?;
        Ok(name)
    }
}

/// Partial update for an employee.
///
/// Outer `None` leaves a column untouched; `Some(None)` clears a nullable one.
#[derive(Debug, Clone, Default)]
pub struct EmployeeUpdate {
    pub name: Option<String>,
    pub department_id: Option<Option<i64>>,
    pub salary: Option<Option<f64>>,
    pub hire_date: Option<Option<NaiveDate>>,
}

impl EmployeeUpdate {
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.department_id.is_none()
            && self.salary.is_none()
            && self.hire_date.is_none()
    }

    /// Returns the trimmed name to store, if the update sets one.
    pub(crate) fn validate(&self) -> Result<Option<String>> {
        let name = self
            .name
            .as_deref()
            .map(|name| validate_name("employee", name))
            .transpose()?;
        if let Some(salary) = self.salary {
            validate_salary(salary)?;
        }
        Ok(name)
    }
}

/// Filter for employee search. Both fields match case-insensitive substrings.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct EmployeeFilter {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub department: Option<String>,
}

impl EmployeeFilter {
    /// Blank strings count as "no filter".
    pub fn name_term(&self) -> Option<&str> {
        self.name.as_deref().map(str::trim).filter(|s| !s.is_empty())
    }

    pub fn department_term(&self) -> Option<&str> {
        self.department.as_deref().map(str::trim).filter(|s| !s.is_empty())
    }

    pub fn is_empty(&self) -> bool {
        self.name_term().is_none() && self.department_term().is_none()
    }
}

/// Salary aggregates over a set of employees.
///
/// Aggregates are `None` when the set has no salaried employees.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct EmployeeStats {
    pub count: i64,
    pub average_salary: Option<f64>,
    pub min_salary: Option<f64>,
    pub max_salary: Option<f64>,
}

// ============================================================================
// Safe query output
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnInfo {
    pub name: String,
    #[serde(rename = "type")]
    pub data_type: String,
}

/// Tabular result of an accepted read-only query.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueryOutput {
    pub columns: Vec<ColumnInfo>,
    pub rows: Vec<Vec<serde_json::Value>>,
    pub row_count: usize,
    pub truncated: bool,
    pub elapsed_ms: u64,
}

// ============================================================================
// Validation
// ============================================================================

fn validate_name(entity: &str, name: &str) -> Result<String> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err(DbError::validation(format!("{} name is required", entity)));
    }
    if trimmed.chars().count() > MAX_NAME_LEN {
        return Err(DbError::validation(format!(
            "{} name must be at most {} characters",
            entity, MAX_NAME_LEN
        )));
    }
    Ok(trimmed.to_string())
}

fn validate_salary(salary: Option<f64>) -> Result<()> {
    match salary {
        Some(value) if !value.is_finite() => {
            Err(DbError::validation("salary must be a finite number"))
        }
        Some(value) if value < 0.0 => Err(DbError::validation("salary must not be negative")),
        _ => Ok(()),
    }
}

/// Parse a `YYYY-MM-DD` hire date.
pub fn parse_hire_date(value: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(value.trim(), HIRE_DATE_FORMAT).map_err(|e| {
        DbError::validation(format!(
            "hire date '{}' is not a valid YYYY-MM-DD date: {}",
            value, e
        ))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_name_validation() {
        assert!(NewEmployee::new("Ada").validate().is_ok());
        assert!(matches!(
            NewEmployee::new("   ").validate(),
            Err(DbError::Validation(_))
        ));
        assert!(NewEmployee::new("x".repeat(MAX_NAME_LEN)).validate().is_ok());
        assert!(NewEmployee::new("x".repeat(MAX_NAME_LEN + 1)).validate().is_err());
        assert_eq!(
            NewDepartment::new("  Sales ").validated_name().unwrap(),
            "Sales"
        );
    }

    #[test]
    fn test_salary_validation() {
        assert!(NewEmployee::new("Ada").with_salary(0.0).validate().is_ok());
        assert!(NewEmployee::new("Ada").with_salary(-1.0).validate().is_err());
        assert!(NewEmployee::new("Ada").with_salary(f64::NAN).validate().is_err());
        assert!(NewEmployee::new("Ada").with_salary(f64::INFINITY).validate().is_err());

        let update = EmployeeUpdate {
            salary: Some(Some(-5.0)),
            ..EmployeeUpdate::default()
        };
        assert!(update.validate().is_err());

        let clear = EmployeeUpdate {
            salary: Some(None),
            ..EmployeeUpdate::default()
        };
        assert!(clear.validate().is_ok());
    }

    #[test]
    fn test_parse_hire_date() {
        assert_eq!(
            parse_hire_date("2021-03-15").unwrap(),
            NaiveDate::from_ymd_opt(2021, 3, 15).unwrap()
        );
        assert!(parse_hire_date("2021-02-30").is_err());
        assert!(parse_hire_date("15/03/2021").is_err());
        assert!(parse_hire_date("").is_err());
    }

    #[test]
    fn test_filter_blank_terms() {
        let filter = EmployeeFilter {
            name: Some("  ".to_string()),
            department: None,
        };
        assert!(filter.is_empty());

        let filter = EmployeeFilter {
            name: Some(" john ".to_string()),
            department: None,
        };
        assert_eq!(filter.name_term(), Some("john"));
    }

    #[test]
    fn test_update_is_empty() {
        assert!(EmployeeUpdate::default().is_empty());
        let update = EmployeeUpdate {
            hire_date: Some(None),
            ..EmployeeUpdate::default()
        };
        assert!(!update.is_empty());
    }

    #[test]
    fn test_employee_serializes_hire_date_as_text() {
        let employee = Employee {
            id: 1,
            name: "Ada".to_string(),
            department_id: None,
            department_name: None,
            salary: Some(100.0),
            hire_date: NaiveDate::from_ymd_opt(2020, 1, 2),
        };
        let json = serde_json::to_value(&employee).unwrap();
        assert_eq!(json["hire_date"], "2020-01-02");
        assert_eq!(json["department_name"], serde_json::Value::Null);
    }
}
