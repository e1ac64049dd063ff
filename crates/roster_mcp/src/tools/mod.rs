//! MCP Tool Implementations
//!
//! Each tool is a read-only view onto the record store. Tools are registered
//! in the [`ToolRegistry`] and dispatched by name.
//!
//! # Tools
//!
//! - **Employees**: list_employees, get_employee, search_employees
//! - **Departments**: list_departments
//! - **Stats**: get_employee_stats
//! - **Query**: safe_query (guarded SELECT)

mod registry;

mod departments;
mod employees;
mod query;
mod stats;

pub use departments::ListDepartmentsTool;
pub use employees::{GetEmployeeTool, ListEmployeesTool, SearchEmployeesTool};
pub use query::SafeQueryTool;
pub use registry::ToolRegistry;
pub use stats::EmployeeStatsTool;

use crate::protocol::ToolDefinition;
use crate::security::OutputBudget;
use crate::ToolError;
use async_trait::async_trait;
use roster_db::RosterDb;
use serde::de::DeserializeOwned;
use serde_json::Value;

/// What a tool gets to work with.
#[derive(Clone)]
pub struct ToolContext {
    pub db: RosterDb,
    pub budget: OutputBudget,
}

impl ToolContext {
    pub fn new(db: RosterDb, budget: OutputBudget) -> Self {
        Self { db, budget }
    }
}

/// Trait for MCP tools
#[async_trait]
pub trait McpTool: Send + Sync {
    /// Tool name (e.g., "list_employees")
    fn name(&self) -> &'static str;

    /// Human-readable description
    fn description(&self) -> &'static str;

    /// JSON Schema for input parameters
    fn input_schema(&self) -> Value;

    /// Execute the tool; the returned value becomes the text content block.
    async fn execute(&self, args: Value, ctx: &ToolContext) -> Result<Value, ToolError>;

    /// Get the tool definition for tools/list
    fn definition(&self) -> ToolDefinition {
        ToolDefinition {
            name: self.name().to_string(),
            description: self.description().to_string(),
            input_schema: self.input_schema(),
        }
    }
}

/// Deserialize tool arguments; absent arguments mean "all defaults".
fn parse_args<T: DeserializeOwned + Default>(args: Value) -> Result<T, ToolError> {
    if args.is_null() {
        return Ok(T::default());
    }
    serde_json::from_value(args).map_err(|e| ToolError::invalid_params(e.to_string()))
}

/// Check an optional `limit` argument against `1..=max`.
///
/// Values above `max` are clamped; zero and negatives are refused.
fn bounded_limit(limit: Option<i64>, default: u32, max: u32) -> Result<u32, ToolError> {
    match limit {
        None => Ok(default),
        Some(value) if value < 1 => Err(ToolError::invalid_params(format!(
            "limit must be at least 1 (got {})",
            value
        ))),
        Some(value) => Ok(u32::try_from(value).unwrap_or(max).min(max)),
    }
}

// Macro to reduce boilerplate for tool error handling
macro_rules! require_param {
    ($args:expr, $name:literal, $ty:ty) => {
        serde_json::from_value::<$ty>($args.get($name).cloned().unwrap_or(Value::Null))
            .map_err(|e| {
                $crate::ToolError::invalid_params(format!("Invalid parameter '{}': {}", $name, e))
            })?
    };
}

pub(crate) use require_param;
