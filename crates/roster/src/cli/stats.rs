//! Salary statistics command

use crate::cli::config::Settings;
use crate::cli::error::HelpfulError;
use crate::cli::open_db;
use crate::cli::output::{print_json, print_stats};

#[derive(Debug)]
pub struct StatsArgs {
    pub department: Option<i64>,
    pub json: bool,
}

pub async fn run(settings: &Settings, args: StatsArgs) -> anyhow::Result<()> {
    let db = open_db(settings).await?;

    let stats = db
        .employee_stats(args.department)
        .await
        .map_err(HelpfulError::from)?;

    if args.json {
        print_json(&stats)?;
    } else {
        if let Some(id) = args.department {
            let name = match db.get_department(id).await {
                Ok(department) => department.name,
                Err(_) => format!("#{} (unknown)", id),
            };
            println!("Department: {}", name);
        }
        print_stats(&stats);
    }

    db.close().await;
    Ok(())
}
