//! Department commands

use crate::cli::config::Settings;
use crate::cli::error::HelpfulError;
use crate::cli::open_db;
use crate::cli::output::{print_departments, print_json};
use clap::Subcommand;
use roster_db::NewDepartment;
use serde_json::json;
use tracing::info;

#[derive(Subcommand, Debug, Clone)]
pub enum DepartmentAction {
    /// List departments ordered by id
    List {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Add a department
    Add {
        name: String,
        /// Output the created record as JSON
        #[arg(long)]
        json: bool,
    },

    /// Rename a department
    Rename {
        id: i64,
        name: String,
        /// Output the updated record as JSON
        #[arg(long)]
        json: bool,
    },

    /// Remove a department that has no employees
    Remove {
        id: i64,
        /// Output the removed record as JSON
        #[arg(long)]
        json: bool,
    },
}

impl DepartmentAction {
    pub fn wants_json(&self) -> bool {
        match self {
            DepartmentAction::List { json }
            | DepartmentAction::Add { json, .. }
            | DepartmentAction::Rename { json, .. }
            | DepartmentAction::Remove { json, .. } => *json,
        }
    }
}

pub async fn run(settings: &Settings, action: DepartmentAction) -> anyhow::Result<()> {
    let db = open_db(settings).await?;

    match action {
        DepartmentAction::List { json } => {
            let departments = db.list_departments().await.map_err(HelpfulError::from)?;
            if json {
                print_json(&json!({ "count": departments.len(), "departments": departments }))?;
            } else {
                print_departments(&departments);
            }
        }

        DepartmentAction::Add { name, json } => {
            let department = db
                .create_department(&NewDepartment::new(name))
                .await
                .map_err(HelpfulError::from)?;
            info!(id = department.id, "Added department");
            if json {
                print_json(&department)?;
            } else {
                println!("Added department #{}: {}", department.id, department.name);
            }
        }

        DepartmentAction::Rename { id, name, json } => {
            let department = db
                .rename_department(id, &name)
                .await
                .map_err(HelpfulError::from)?;
            info!(id, "Renamed department");
            if json {
                print_json(&department)?;
            } else {
                println!("Renamed department #{} to {}", department.id, department.name);
            }
        }

        DepartmentAction::Remove { id, json } => {
            let department = db
                .delete_department(id)
                .await
                .map_err(HelpfulError::from)?;
            info!(id, "Removed department");
            if json {
                print_json(&department)?;
            } else {
                println!("Removed department #{}: {}", department.id, department.name);
            }
        }
    }

    db.close().await;
    Ok(())
}
