//! MCP (Model Context Protocol) server for Roster
//!
//! Exposes the record store to AI assistants as read-only tools and
//! resources, speaking JSON-RPC 2.0 over stdio.
//!
//! ```text
//! MCP client ──stdin/stdout──▶ McpServer ──▶ ToolRegistry ──▶ RosterDb (read-only pool)
//!                                  │
//!                                  └──▶ AuditLog (NDJSON), OutputBudget
//! ```
//!
//! Every tool reads. Free-text SQL goes through `roster_db::sql_guard` first
//! and then runs on a read-only connection.

mod error;
pub mod protocol;
pub mod resources;
pub mod security;
pub mod server;
pub mod tools;

// Re-exports for convenience
pub use error::ToolError;
pub use protocol::{JsonRpcError, JsonRpcRequest, JsonRpcResponse, RequestId};
pub use security::{AuditLog, OutputBudget, SecurityConfig};
pub use server::{McpServer, McpServerConfig};
pub use tools::{McpTool, ToolContext, ToolRegistry};
