//! Employee read tools: list_employees, get_employee, search_employees

use super::{bounded_limit, parse_args, require_param, McpTool, ToolContext};
use crate::ToolError;
use async_trait::async_trait;
use roster_db::EmployeeFilter;
use serde::Deserialize;
use serde_json::{json, Value};

const LIST_DEFAULT_LIMIT: u32 = 100;
const LIST_MAX_LIMIT: u32 = 1000;
const SEARCH_DEFAULT_LIMIT: u32 = 50;
const SEARCH_MAX_LIMIT: u32 = 500;

// =============================================================================
// list_employees
// =============================================================================

pub struct ListEmployeesTool;

#[derive(Debug, Default, Deserialize)]
struct ListEmployeesArgs {
    #[serde(default)]
    limit: Option<i64>,
}

#[async_trait]
impl McpTool for ListEmployeesTool {
    fn name(&self) -> &'static str {
        "list_employees"
    }

    fn description(&self) -> &'static str {
        "List employees ordered by id, with their department name."
    }

    fn input_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "limit": {
                    "type": "integer",
                    "minimum": 1,
                    "maximum": LIST_MAX_LIMIT,
                    "default": LIST_DEFAULT_LIMIT,
                    "description": "Maximum number of employees to return"
                }
            }
        })
    }

    async fn execute(&self, args: Value, ctx: &ToolContext) -> Result<Value, ToolError> {
        let args: ListEmployeesArgs = parse_args(args)?;
        let limit = bounded_limit(args.limit, LIST_DEFAULT_LIMIT, LIST_MAX_LIMIT)?;

        let employees = ctx.db.list_employees(Some(limit)).await?;

        Ok(json!({
            "count": employees.len(),
            "employees": employees,
        }))
    }
}

// =============================================================================
// get_employee
// =============================================================================

pub struct GetEmployeeTool;

#[async_trait]
impl McpTool for GetEmployeeTool {
    fn name(&self) -> &'static str {
        "get_employee"
    }

    fn description(&self) -> &'static str {
        "Fetch one employee by id."
    }

    fn input_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "employee_id": {
                    "type": "integer",
                    "description": "Employee id"
                }
            },
            "required": ["employee_id"]
        })
    }

    async fn execute(&self, args: Value, ctx: &ToolContext) -> Result<Value, ToolError> {
        let employee_id = require_param!(args, "employee_id", i64);

        let employee = ctx.db.get_employee(employee_id).await?;
        Ok(serde_json::to_value(employee)?)
    }
}

// =============================================================================
// search_employees
// =============================================================================

pub struct SearchEmployeesTool;

#[derive(Debug, Default, Deserialize)]
struct SearchEmployeesArgs {
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    department: Option<String>,
    #[serde(default)]
    limit: Option<i64>,
}

#[async_trait]
impl McpTool for SearchEmployeesTool {
    fn name(&self) -> &'static str {
        "search_employees"
    }

    fn description(&self) -> &'static str {
        "Search employees by case-insensitive substring of name and/or department name. \
         With no filters, returns everyone up to the limit."
    }

    fn input_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "name": {
                    "type": "string",
                    "description": "Substring of the employee name"
                },
                "department": {
                    "type": "string",
                    "description": "Substring of the department name"
                },
                "limit": {
                    "type": "integer",
                    "minimum": 1,
                    "maximum": SEARCH_MAX_LIMIT,
                    "default": SEARCH_DEFAULT_LIMIT
                }
            }
        })
    }

    async fn execute(&self, args: Value, ctx: &ToolContext) -> Result<Value, ToolError> {
        let args: SearchEmployeesArgs = parse_args(args)?;
        let limit = bounded_limit(args.limit, SEARCH_DEFAULT_LIMIT, SEARCH_MAX_LIMIT)?;

        let filter = EmployeeFilter {
            name: args.name,
            department: args.department,
        };
        let employees = ctx.db.search_employees(&filter, Some(limit)).await?;

        Ok(json!({
            "count": employees.len(),
            "employees": employees,
        }))
    }
}
