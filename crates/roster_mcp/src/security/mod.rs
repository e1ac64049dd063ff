//! Output limits and audit logging for the MCP server.

mod audit;
mod output_budget;

pub use audit::AuditLog;
pub use output_budget::OutputBudget;

use thiserror::Error;

/// Security subsystem errors.
#[derive(Debug, Error)]
pub enum SecurityError {
    #[error("Output too large: {size} bytes exceeds limit of {max} bytes")]
    OutputTooLarge { size: usize, max: usize },

    #[error("Audit log error: {0}")]
    AuditError(String),
}

/// Limits and audit sink shared by every request.
#[derive(Debug, Default)]
pub struct SecurityConfig {
    pub output_budget: OutputBudget,
    pub audit_log: Option<AuditLog>,
}
