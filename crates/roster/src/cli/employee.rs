//! Employee commands

use crate::cli::config::Settings;
use crate::cli::error::HelpfulError;
use crate::cli::open_db;
use crate::cli::output::{print_employee, print_employees, print_json};
use clap::Subcommand;
use roster_db::{parse_hire_date, EmployeeFilter, EmployeeUpdate, NewEmployee};
use serde_json::json;
use tracing::info;

const DEFAULT_LIST_LIMIT: u32 = 100;

#[derive(Subcommand, Debug, Clone)]
pub enum EmployeeAction {
    /// List employees ordered by id
    List {
        /// Maximum number of employees to show
        #[arg(long, default_value_t = DEFAULT_LIST_LIMIT)]
        limit: u32,
        /// Show every employee
        #[arg(long, conflicts_with = "limit")]
        all: bool,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show one employee
    Show {
        id: i64,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Add an employee
    Add {
        name: String,
        /// Department id
        #[arg(long)]
        department: Option<i64>,
        #[arg(long)]
        salary: Option<f64>,
        /// Hire date (YYYY-MM-DD)
        #[arg(long)]
        hire_date: Option<String>,
        /// Output the created record as JSON
        #[arg(long)]
        json: bool,
    },

    /// Change fields of an employee
    Update {
        id: i64,
        #[arg(long)]
        name: Option<String>,
        /// Move to a department
        #[arg(long, conflicts_with = "no_department")]
        department: Option<i64>,
        /// Remove from their department
        #[arg(long)]
        no_department: bool,
        #[arg(long, conflicts_with = "clear_salary")]
        salary: Option<f64>,
        #[arg(long)]
        clear_salary: bool,
        /// Hire date (YYYY-MM-DD)
        #[arg(long, conflicts_with = "clear_hire_date")]
        hire_date: Option<String>,
        #[arg(long)]
        clear_hire_date: bool,
        /// Output the updated record as JSON
        #[arg(long)]
        json: bool,
    },

    /// Remove an employee
    Remove {
        id: i64,
        /// Output the removed record as JSON
        #[arg(long)]
        json: bool,
    },

    /// Search by name and/or department name (case-insensitive substrings)
    Search {
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        department: Option<String>,
        /// Maximum number of employees to show
        #[arg(long, default_value_t = DEFAULT_LIST_LIMIT)]
        limit: u32,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

impl EmployeeAction {
    pub fn wants_json(&self) -> bool {
        match self {
            EmployeeAction::List { json, .. }
            | EmployeeAction::Show { json, .. }
            | EmployeeAction::Add { json, .. }
            | EmployeeAction::Update { json, .. }
            | EmployeeAction::Remove { json, .. }
            | EmployeeAction::Search { json, .. } => *json,
        }
    }
}

pub async fn run(settings: &Settings, action: EmployeeAction) -> anyhow::Result<()> {
    let db = open_db(settings).await?;

    match action {
        EmployeeAction::List { limit, all, json } => {
            let limit = if all { None } else { Some(limit) };
            let employees = db.list_employees(limit).await.map_err(HelpfulError::from)?;
            if json {
                print_json(&json!({ "count": employees.len(), "employees": employees }))?;
            } else {
                print_employees(&employees);
            }
        }

        EmployeeAction::Show { id, json } => {
            let employee = db.get_employee(id).await.map_err(HelpfulError::from)?;
            if json {
                print_json(&employee)?;
            } else {
                print_employee(&employee);
            }
        }

        EmployeeAction::Add {
            name,
            department,
            salary,
            hire_date,
            json,
        } => {
            let new = NewEmployee {
                name,
                department_id: department,
                salary,
                hire_date: hire_date
                    .as_deref()
                    .map(parse_hire_date)
                    .transpose()
                    .map_err(HelpfulError::from)?,
            };
            let employee = db.create_employee(&new).await.map_err(HelpfulError::from)?;
            info!(id = employee.id, "Added employee");
            if json {
                print_json(&employee)?;
            } else {
                println!("Added employee #{}: {}", employee.id, employee.name);
            }
        }

        EmployeeAction::Update {
            id,
            name,
            department,
            no_department,
            salary,
            clear_salary,
            hire_date,
            clear_hire_date,
            json,
        } => {
            let hire_date = hire_date
                .as_deref()
                .map(parse_hire_date)
                .transpose()
                .map_err(HelpfulError::from)?;
            let update = EmployeeUpdate {
                name,
                department_id: tri_state(department, no_department),
                salary: tri_state(salary, clear_salary),
                hire_date: tri_state(hire_date, clear_hire_date),
            };
            if update.is_empty() {
                return Err(HelpfulError::new("Nothing to update")
                    .with_kind("ValidationError")
                    .with_suggestion(format!(
                        "TRY: roster employee update {} --salary 90000",
                        id
                    ))
                    .into());
            }

            let employee = db
                .update_employee(id, &update)
                .await
                .map_err(HelpfulError::from)?;
            info!(id, "Updated employee");
            if json {
                print_json(&employee)?;
            } else {
                println!("Updated employee #{}: {}", employee.id, employee.name);
            }
        }

        EmployeeAction::Remove { id, json } => {
            let employee = db.delete_employee(id).await.map_err(HelpfulError::from)?;
            info!(id, "Removed employee");
            if json {
                print_json(&employee)?;
            } else {
                println!("Removed employee #{}: {}", employee.id, employee.name);
            }
        }

        EmployeeAction::Search {
            name,
            department,
            limit,
            json,
        } => {
            let filter = EmployeeFilter { name, department };
            let employees = db
                .search_employees(&filter, Some(limit))
                .await
                .map_err(HelpfulError::from)?;
            if json {
                print_json(&json!({ "count": employees.len(), "employees": employees }))?;
            } else {
                print_employees(&employees);
            }
        }
    }

    db.close().await;
    Ok(())
}

/// Map a `--value` / `--clear-value` flag pair onto a partial update field.
fn tri_state<T>(value: Option<T>, clear: bool) -> Option<Option<T>> {
    match (value, clear) {
        (Some(v), _) => Some(Some(v)),
        (None, true) => Some(None),
        (None, false) => None,
    }
}
