//! Output formatting utilities for CLI commands
//!
//! Tables go through comfy-table; `--json` output is pretty-printed serde_json.

use comfy_table::{presets::UTF8_FULL_CONDENSED, Cell, Color, ContentArrangement, Table};
use roster_db::{Department, Employee, EmployeeStats, QueryOutput};
use serde::Serialize;
use serde_json::Value;

/// Placeholder for missing values in tables
const EMPTY: &str = "-";

/// Format a salary with two decimals and thousands separators
///
/// Examples:
/// - 500.0 -> "500.00"
/// - 85000.5 -> "85,000.50"
pub fn format_salary(salary: f64) -> String {
    let fixed = format!("{:.2}", salary.abs());
    let (whole, frac) = fixed.split_once('.').unwrap_or((fixed.as_str(), "00"));

    let mut grouped = String::with_capacity(whole.len() + whole.len() / 3);
    for (i, ch) in whole.chars().enumerate() {
        if i > 0 && (whole.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    let sign = if salary < 0.0 { "-" } else { "" };
    format!("{}{}.{}", sign, grouped, frac)
}

pub fn format_optional<T: ToString>(value: Option<T>) -> String {
    value.map(|v| v.to_string()).unwrap_or_else(|| EMPTY.to_string())
}

fn format_optional_salary(value: Option<f64>) -> String {
    value.map(format_salary).unwrap_or_else(|| EMPTY.to_string())
}

/// Render a query cell for table output
pub fn format_cell(value: &Value) -> String {
    match value {
        Value::Null => "NULL".to_string(),
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Print a table with headers
pub fn print_table(headers: &[&str], rows: Vec<Vec<String>>) {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL_CONDENSED)
        .set_content_arrangement(ContentArrangement::Dynamic);

    let header_cells: Vec<Cell> = headers
        .iter()
        .map(|h| Cell::new(h).fg(Color::Cyan))
        .collect();
    table.set_header(header_cells);

    for row in rows {
        table.add_row(row);
    }

    println!("{}", table);
}

/// Print any serializable value as pretty JSON
pub fn print_json<T: Serialize + ?Sized>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

pub fn employee_row(employee: &Employee) -> Vec<String> {
    vec![
        employee.id.to_string(),
        employee.name.clone(),
        employee
            .department_name
            .clone()
            .unwrap_or_else(|| EMPTY.to_string()),
        format_optional_salary(employee.salary),
        format_optional(employee.hire_date),
    ]
}

pub fn print_employees(employees: &[Employee]) {
    if employees.is_empty() {
        println!("No employees found.");
        return;
    }
    print_table(
        &["ID", "NAME", "DEPARTMENT", "SALARY", "HIRED"],
        employees.iter().map(employee_row).collect(),
    );
    println!("{} employee(s)", employees.len());
}

/// Print one employee as a key/value listing
pub fn print_employee(employee: &Employee) {
    let department = match (&employee.department_name, employee.department_id) {
        (Some(name), Some(id)) => format!("{} (#{})", name, id),
        _ => EMPTY.to_string(),
    };
    println!("Employee #{}", employee.id);
    println!("  Name:       {}", employee.name);
    println!("  Department: {}", department);
    println!("  Salary:     {}", format_optional_salary(employee.salary));
    println!("  Hired:      {}", format_optional(employee.hire_date));
}

pub fn print_departments(departments: &[Department]) {
    if departments.is_empty() {
        println!("No departments found.");
        return;
    }
    print_table(
        &["ID", "NAME"],
        departments
            .iter()
            .map(|d| vec![d.id.to_string(), d.name.clone()])
            .collect(),
    );
}

pub fn print_stats(stats: &EmployeeStats) {
    print_table(
        &["EMPLOYEES", "AVERAGE", "MIN", "MAX"],
        vec![vec![
            stats.count.to_string(),
            format_optional_salary(stats.average_salary),
            format_optional_salary(stats.min_salary),
            format_optional_salary(stats.max_salary),
        ]],
    );
}

pub fn print_query_output(output: &QueryOutput) {
    let headers: Vec<&str> = output.columns.iter().map(|c| c.name.as_str()).collect();
    let rows = output
        .rows
        .iter()
        .map(|row| row.iter().map(format_cell).collect())
        .collect();
    print_table(&headers, rows);

    if output.truncated {
        println!(
            "{} row(s) in {} ms (truncated, use --limit to see more)",
            output.row_count, output.elapsed_ms
        );
    } else {
        println!("{} row(s) in {} ms", output.row_count, output.elapsed_ms);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use serde_json::json;

    #[test]
    fn test_format_salary() {
        assert_eq!(format_salary(0.0), "0.00");
        assert_eq!(format_salary(500.0), "500.00");
        assert_eq!(format_salary(85000.5), "85,000.50");
        assert_eq!(format_salary(1234567.891), "1,234,567.89");
        assert_eq!(format_salary(-1500.0), "-1,500.00");
    }

    #[test]
    fn test_format_cell() {
        assert_eq!(format_cell(&Value::Null), "NULL");
        assert_eq!(format_cell(&json!("Ada")), "Ada");
        assert_eq!(format_cell(&json!(42)), "42");
        assert_eq!(format_cell(&json!(1.5)), "1.5");
    }

    #[test]
    fn test_employee_row_placeholders() {
        let employee = Employee {
            id: 3,
            name: "Ada".to_string(),
            department_id: None,
            department_name: None,
            salary: None,
            hire_date: NaiveDate::from_ymd_opt(2020, 1, 2),
        };
        assert_eq!(
            employee_row(&employee),
            vec!["3", "Ada", "-", "-", "2020-01-02"]
        );
    }
}
