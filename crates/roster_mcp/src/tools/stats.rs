//! get_employee_stats

use super::{parse_args, McpTool, ToolContext};
use crate::ToolError;
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{json, Value};

pub struct EmployeeStatsTool;

#[derive(Debug, Default, Deserialize)]
struct StatsArgs {
    #[serde(default)]
    department_id: Option<i64>,
}

#[async_trait]
impl McpTool for EmployeeStatsTool {
    fn name(&self) -> &'static str {
        "get_employee_stats"
    }

    fn description(&self) -> &'static str {
        "Headcount and salary aggregates (average, min, max), optionally for one department. \
         Aggregates are null when no salaries are recorded."
    }

    fn input_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "department_id": {
                    "type": "integer",
                    "description": "Restrict to one department"
                }
            }
        })
    }

    async fn execute(&self, args: Value, ctx: &ToolContext) -> Result<Value, ToolError> {
        let args: StatsArgs = parse_args(args)?;
        let stats = ctx.db.employee_stats(args.department_id).await?;
        Ok(serde_json::to_value(stats)?)
    }
}
