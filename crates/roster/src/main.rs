//! Roster command-line interface
//!
//! - **Records**: employee and department CRUD against the local SQLite store
//! - **Queries**: guarded read-only SQL and salary statistics
//! - **MCP**: serve the read tools over stdio

use clap::{Parser, Subcommand};
use roster_logging::{init_logging, LogConfig};
use std::path::PathBuf;
use std::process::ExitCode;

mod cli;

#[derive(Parser, Debug)]
#[command(
    name = "roster",
    version,
    about = "Employee and department records with a read-only query surface"
)]
struct Cli {
    /// Enable verbose (debug) logging on stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Database file (defaults to $ROSTER_HOME/roster.sqlite3)
    #[arg(long, global = true, env = "ROSTER_DB")]
    db: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Create the database and schema
    Init {
        /// Also load a small set of sample departments and employees
        #[arg(long)]
        sample: bool,
    },

    /// Manage employees
    Employee {
        #[command(subcommand)]
        action: cli::employee::EmployeeAction,
    },

    /// Manage departments
    Department {
        #[command(subcommand)]
        action: cli::department::DepartmentAction,
    },

    /// Salary statistics, overall or for one department
    Stats {
        /// Restrict to one department id
        #[arg(long)]
        department: Option<i64>,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Run a read-only SQL query through the guard
    Query {
        /// SQL text (a single SELECT statement)
        sql: String,

        /// Maximum rows to return
        #[arg(long)]
        limit: Option<usize>,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Serve the read tools over MCP (JSON-RPC on stdio)
    Mcp,

    /// Show resolved configuration
    Config(cli::config::ConfigArgs),
}

fn command_wants_json(command: &Commands) -> bool {
    match command {
        Commands::Employee { action } => action.wants_json(),
        Commands::Department { action } => action.wants_json(),
        Commands::Stats { json, .. } => *json,
        Commands::Query { json, .. } => *json,
        Commands::Config(args) => args.json,
        _ => false,
    }
}

async fn run_command(cli: Cli) -> anyhow::Result<()> {
    let settings = cli::config::Settings::resolve(cli.db)?;

    match cli.command {
        Commands::Init { sample } => cli::init::run(&settings, sample).await,
        Commands::Employee { action } => cli::employee::run(&settings, action).await,
        Commands::Department { action } => cli::department::run(&settings, action).await,
        Commands::Stats { department, json } => {
            cli::stats::run(&settings, cli::stats::StatsArgs { department, json }).await
        }
        Commands::Query { sql, limit, json } => {
            cli::query::run(&settings, cli::query::QueryArgs { sql, limit, json }).await
        }
        Commands::Mcp => cli::mcp::run(&settings).await,
        Commands::Config(args) => cli::config::run(&settings, args),
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let json_mode = command_wants_json(&cli.command);
    let is_mcp = matches!(cli.command, Commands::Mcp);

    // Regular commands keep stderr quiet unless asked; the server logs at info.
    if let Err(err) = init_logging(LogConfig {
        app_name: if is_mcp { "roster-mcp" } else { "roster" },
        verbose: cli.verbose,
        quiet: !is_mcp,
        log_dir: None,
    }) {
        eprintln!("Warning: failed to initialize logging: {}", err);
    }

    let runtime = match tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
    {
        Ok(runtime) => runtime,
        Err(err) => {
            eprintln!("Failed to start async runtime: {}", err);
            return ExitCode::from(1);
        }
    };

    let result = runtime.block_on(run_command(cli));

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            if json_mode {
                cli::error::print_json_error(&err);
            } else {
                eprintln!("{:?}", err);
            }
            ExitCode::from(1)
        }
    }
}
