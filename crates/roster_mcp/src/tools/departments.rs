//! list_departments

use super::{McpTool, ToolContext};
use crate::ToolError;
use async_trait::async_trait;
use serde_json::{json, Value};

pub struct ListDepartmentsTool;

#[async_trait]
impl McpTool for ListDepartmentsTool {
    fn name(&self) -> &'static str {
        "list_departments"
    }

    fn description(&self) -> &'static str {
        "List all departments ordered by id."
    }

    fn input_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {}
        })
    }

    async fn execute(&self, _args: Value, ctx: &ToolContext) -> Result<Value, ToolError> {
        let departments = ctx.db.list_departments().await?;

        Ok(json!({
            "count": departments.len(),
            "departments": departments,
        }))
    }
}
