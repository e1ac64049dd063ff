//! Guarded read-only SQL command

use crate::cli::config::Settings;
use crate::cli::error::HelpfulError;
use crate::cli::open_db;
use crate::cli::output::{print_json, print_query_output};
use tracing::debug;

#[derive(Debug)]
pub struct QueryArgs {
    pub sql: String,
    pub limit: Option<usize>,
    pub json: bool,
}

pub async fn run(settings: &Settings, args: QueryArgs) -> anyhow::Result<()> {
    let max_rows = match args.limit {
        Some(0) => {
            return Err(HelpfulError::new("--limit must be at least 1")
                .with_kind("InvalidParams")
                .into())
        }
        Some(limit) => limit.min(settings.max_rows),
        None => settings.max_rows,
    };

    let db = open_db(settings).await?;
    debug!(max_rows, "Running guarded query");

    let output = db
        .safe_query(&args.sql, max_rows)
        .await
        .map_err(HelpfulError::from)?;

    if args.json {
        print_json(&output)?;
    } else {
        print_query_output(&output);
    }

    db.close().await;
    Ok(())
}
