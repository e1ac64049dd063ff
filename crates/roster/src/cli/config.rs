//! Configuration for Roster
//!
//! Everything lives under `$ROSTER_HOME` (default `~/.roster/`):
//!
//! ```text
//! ~/.roster/
//! ├── roster.sqlite3     # record store
//! ├── config.toml        # optional overrides
//! ├── mcp_audit.ndjson   # MCP request/response audit trail
//! └── logs/
//! ```
//!
//! Priority: `--db` / `ROSTER_DB` > `config.toml` > built-in defaults.

use anyhow::Context;
use roster_mcp::OutputBudget;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

const DB_FILE: &str = "roster.sqlite3";
const CONFIG_FILE: &str = "config.toml";
const AUDIT_FILE: &str = "mcp_audit.ndjson";

/// Contents of `config.toml`. Every key is optional.
#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FileConfig {
    /// Database path; relative paths are taken from `$ROSTER_HOME`
    pub db_path: Option<PathBuf>,
    /// Row cap for `query` and the MCP server
    pub max_rows: Option<usize>,
    /// Byte cap for one MCP tool response
    pub max_response_bytes: Option<usize>,
    /// Write the MCP audit log (default on)
    pub audit_log: Option<bool>,
}

impl FileConfig {
    /// Load `config.toml`, or defaults if it does not exist.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        toml::from_str(&content)
            .map_err(|e| anyhow::anyhow!("Failed to parse {}: {}", path.display(), e))
    }
}

/// Where a resolved value came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Source {
    Flag,
    File,
    Default,
}

impl Source {
    pub fn as_str(&self) -> &'static str {
        match self {
            Source::Flag => "flag/env",
            Source::File => "config.toml",
            Source::Default => "default",
        }
    }
}

/// Fully resolved settings for one invocation.
#[derive(Debug, Clone)]
pub struct Settings {
    pub home: PathBuf,
    pub config_path: PathBuf,
    pub db_path: PathBuf,
    pub db_source: Source,
    pub max_rows: usize,
    pub max_response_bytes: usize,
    pub audit_log: Option<PathBuf>,
}

impl Settings {
    /// Resolve against `$ROSTER_HOME`.
    pub fn resolve(db_override: Option<PathBuf>) -> anyhow::Result<Self> {
        let home = roster_logging::roster_home()?;
        Self::resolve_from(home, db_override)
    }

    pub fn resolve_from(home: PathBuf, db_override: Option<PathBuf>) -> anyhow::Result<Self> {
        let config_path = home.join(CONFIG_FILE);
        let file = FileConfig::load(&config_path)?;
        let defaults = OutputBudget::default();

        let (db_path, db_source) = match (db_override, file.db_path) {
            (Some(path), _) => (path, Source::Flag),
            (None, Some(path)) if path.is_relative() => (home.join(path), Source::File),
            (None, Some(path)) => (path, Source::File),
            (None, None) => (home.join(DB_FILE), Source::Default),
        };

        let max_rows = file.max_rows.unwrap_or(defaults.max_rows());
        if max_rows == 0 {
            anyhow::bail!("{}: max_rows must be at least 1", config_path.display());
        }
        let max_response_bytes = file.max_response_bytes.unwrap_or(defaults.max_bytes());
        if max_response_bytes == 0 {
            anyhow::bail!(
                "{}: max_response_bytes must be at least 1",
                config_path.display()
            );
        }

        let audit_log = file
            .audit_log
            .unwrap_or(true)
            .then(|| home.join(AUDIT_FILE));

        Ok(Self {
            home,
            config_path,
            db_path,
            db_source,
            max_rows,
            max_response_bytes,
            audit_log,
        })
    }
}

/// Arguments for the config command
#[derive(Debug, clap::Args)]
pub struct ConfigArgs {
    /// Show resolved settings in JSON format
    #[arg(long)]
    pub json: bool,
}

/// Run the config command - shows resolved settings
pub fn run(settings: &Settings, args: ConfigArgs) -> anyhow::Result<()> {
    if args.json {
        let config = serde_json::json!({
            "home": settings.home.to_string_lossy(),
            "config_file": {
                "path": settings.config_path.to_string_lossy(),
                "exists": settings.config_path.exists(),
            },
            "database": {
                "path": settings.db_path.to_string_lossy(),
                "exists": settings.db_path.exists(),
                "source": settings.db_source.as_str(),
            },
            "max_rows": settings.max_rows,
            "max_response_bytes": settings.max_response_bytes,
            "audit_log": settings.audit_log.as_ref().map(|p| p.to_string_lossy()),
        });
        println!("{}", serde_json::to_string_pretty(&config)?);
    } else {
        println!("ROSTER CONFIGURATION");
        println!("====================");
        println!();
        println!("Home:        {}", settings.home.display());
        println!(
            "Config file: {}{}",
            settings.config_path.display(),
            exists_marker(&settings.config_path)
        );
        println!(
            "Database:    {}{} [{}]",
            settings.db_path.display(),
            exists_marker(&settings.db_path),
            settings.db_source.as_str()
        );
        println!();
        println!("Max rows:           {}", settings.max_rows);
        println!("Max response bytes: {}", settings.max_response_bytes);
        match &settings.audit_log {
            Some(path) => println!("MCP audit log:      {}", path.display()),
            None => println!("MCP audit log:      disabled"),
        }
    }

    Ok(())
}

fn exists_marker(path: &Path) -> &'static str {
    if path.exists() {
        ""
    } else {
        " (missing)"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_defaults_without_config_file() {
        let tmp = TempDir::new().unwrap();
        let settings = Settings::resolve_from(tmp.path().to_path_buf(), None).unwrap();

        assert_eq!(settings.db_path, tmp.path().join("roster.sqlite3"));
        assert_eq!(settings.db_source, Source::Default);
        assert_eq!(settings.max_rows, 1000);
        assert_eq!(settings.max_response_bytes, 1024 * 1024);
        assert_eq!(settings.audit_log, Some(tmp.path().join("mcp_audit.ndjson")));
    }

    #[test]
    fn test_file_overrides_defaults() {
        let tmp = TempDir::new().unwrap();
        std::fs::write(
            tmp.path().join("config.toml"),
            "db_path = \"data/hr.sqlite3\"\nmax_rows = 50\naudit_log = false\n",
        )
        .unwrap();

        let settings = Settings::resolve_from(tmp.path().to_path_buf(), None).unwrap();
        assert_eq!(settings.db_path, tmp.path().join("data/hr.sqlite3"));
        assert_eq!(settings.db_source, Source::File);
        assert_eq!(settings.max_rows, 50);
        assert!(settings.audit_log.is_none());
    }

    #[test]
    fn test_flag_beats_file() {
        let tmp = TempDir::new().unwrap();
        std::fs::write(tmp.path().join("config.toml"), "db_path = \"/srv/hr.sqlite3\"\n").unwrap();

        let settings = Settings::resolve_from(
            tmp.path().to_path_buf(),
            Some(PathBuf::from("/tmp/override.sqlite3")),
        )
        .unwrap();
        assert_eq!(settings.db_path, PathBuf::from("/tmp/override.sqlite3"));
        assert_eq!(settings.db_source, Source::Flag);
    }

    #[test]
    fn test_bad_config_is_an_error() {
        let tmp = TempDir::new().unwrap();
        std::fs::write(tmp.path().join("config.toml"), "max_rows = 0\n").unwrap();
        assert!(Settings::resolve_from(tmp.path().to_path_buf(), None).is_err());

        std::fs::write(tmp.path().join("config.toml"), "colour = \"blue\"\n").unwrap();
        let err = Settings::resolve_from(tmp.path().to_path_buf(), None).unwrap_err();
        assert!(err.to_string().contains("config.toml"));
    }
}
