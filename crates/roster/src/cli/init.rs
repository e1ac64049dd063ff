//! `roster init`: create the database, optionally with sample records

use crate::cli::config::Settings;
use crate::cli::create_db;
use crate::cli::error::HelpfulError;
use anyhow::Context;
use roster_db::{parse_hire_date, NewDepartment, NewEmployee, RosterDb};
use tracing::info;

const SAMPLE_DEPARTMENTS: &[&str] = &["Engineering", "Sales", "Human Resources"];

/// (name, department index, salary, hire date)
const SAMPLE_EMPLOYEES: &[(&str, usize, f64, &str)] = &[
    ("John Doe", 0, 95000.0, "2019-04-01"),
    ("Jane Smith", 0, 105000.0, "2018-09-17"),
    ("Carlos Rivera", 1, 62000.0, "2021-01-11"),
    ("Mei Chen", 1, 71500.0, "2020-06-29"),
    ("Priya Patel", 2, 58000.0, "2022-03-07"),
];

pub async fn run(settings: &Settings, sample: bool) -> anyhow::Result<()> {
    let existed = settings.db_path.exists();
    let db = create_db(settings).await?;

    if existed {
        println!("Database already initialized: {}", settings.db_path.display());
    } else {
        println!("Created database: {}", settings.db_path.display());
    }

    if sample {
        if !db.list_departments().await.map_err(HelpfulError::from)?.is_empty() {
            db.close().await;
            return Err(HelpfulError::new("Database already has records; sample data not loaded")
                .with_kind("ConstraintViolation")
                .with_suggestion("TRY: Use a fresh file: roster --db /tmp/sample.sqlite3 init --sample")
                .into());
        }
        let (departments, employees) = load_sample(&db).await?;
        println!(
            "Loaded sample data: {} department(s), {} employee(s)",
            departments, employees
        );
    }

    db.close().await;
    Ok(())
}

async fn load_sample(db: &RosterDb) -> anyhow::Result<(usize, usize)> {
    let mut department_ids = Vec::with_capacity(SAMPLE_DEPARTMENTS.len());
    for name in SAMPLE_DEPARTMENTS {
        let department = db
            .create_department(&NewDepartment::new(*name))
            .await
            .with_context(|| format!("Failed to create sample department {}", name))?;
        department_ids.push(department.id);
    }

    for (name, department, salary, hired) in SAMPLE_EMPLOYEES {
        let employee = NewEmployee::new(*name)
            .with_department(department_ids[*department])
            .with_salary(*salary)
            .with_hire_date(parse_hire_date(hired)?);
        db.create_employee(&employee)
            .await
            .with_context(|| format!("Failed to create sample employee {}", name))?;
    }

    info!(
        departments = department_ids.len(),
        employees = SAMPLE_EMPLOYEES.len(),
        "Loaded sample data"
    );
    Ok((department_ids.len(), SAMPLE_EMPLOYEES.len()))
}
