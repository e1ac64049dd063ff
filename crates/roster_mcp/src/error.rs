//! Tool error type.

use roster_db::DbError;
use thiserror::Error;

/// Errors raised while dispatching or executing a tool.
#[derive(Debug, Error)]
pub enum ToolError {
    /// Invalid parameters provided to the tool
    #[error("Invalid parameters: {0}")]
    InvalidParams(String),

    /// No tool registered under this name
    #[error("Unknown tool: {0}")]
    UnknownTool(String),

    /// No resource served at this URI
    #[error("Unknown resource: {0}")]
    UnknownResource(String),

    /// Record store failure, including guard rejections
    #[error(transparent)]
    Db(#[from] DbError),

    /// Serialization/deserialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl ToolError {
    pub fn invalid_params(msg: impl Into<String>) -> Self {
        Self::InvalidParams(msg.into())
    }

    /// Refusal kind reported to MCP clients.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::InvalidParams(_) => "InvalidParams",
            Self::UnknownTool(_) => "UnknownTool",
            Self::UnknownResource(_) => "UnknownResource",
            Self::Db(err) => err.kind(),
            Self::Serialization(_) => "SerializationError",
        }
    }

    /// JSON-RPC error code, for errors surfaced at the protocol level.
    pub fn error_code(&self) -> i32 {
        match self {
            Self::InvalidParams(_) | Self::UnknownTool(_) | Self::UnknownResource(_) => -32602,
            Self::Db(_) | Self::Serialization(_) => -32603,
        }
    }
}
