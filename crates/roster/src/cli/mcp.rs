//! MCP Server CLI launcher
//!
//! Serves the read tools over stdio using JSON-RPC. Stdout carries protocol
//! frames only; logs go to stderr and the log file.

use crate::cli::config::Settings;
use crate::cli::create_db;
use anyhow::Result;
use roster_mcp::{McpServer, McpServerConfig};

/// Run the MCP server until stdin closes
pub async fn run(settings: &Settings) -> Result<()> {
    let db = create_db(settings).await?;

    let config = McpServerConfig {
        max_response_bytes: settings.max_response_bytes,
        max_rows: settings.max_rows,
        audit_log_path: settings.audit_log.clone(),
        ..McpServerConfig::default()
    };

    let mut server = McpServer::new(db.clone(), config)?;

    tracing::info!(
        db = %settings.db_path.display(),
        "MCP Server starting via stdio"
    );

    let result = server.run().await;
    db.close().await;
    result
}
