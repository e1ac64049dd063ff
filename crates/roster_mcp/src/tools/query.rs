//! safe_query - guarded read-only SQL
//!
//! The query text goes through `roster_db::sql_guard` before anything touches
//! the database, then runs on the read-only pool. Row count is capped by the
//! output budget.

use super::{require_param, McpTool, ToolContext};
use crate::ToolError;
use async_trait::async_trait;
use serde_json::{json, Value};

pub struct SafeQueryTool;

#[async_trait]
impl McpTool for SafeQueryTool {
    fn name(&self) -> &'static str {
        "safe_query"
    }

    fn description(&self) -> &'static str {
        "Run a single read-only SELECT against the employees and departments tables. \
         Write statements, stacked statements and SQL comments are refused."
    }

    fn input_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "query": {
                    "type": "string",
                    "description": "A single SELECT statement"
                },
                "limit": {
                    "type": "integer",
                    "minimum": 1,
                    "description": "Maximum rows to return (capped by the server's row budget)"
                }
            },
            "required": ["query"]
        })
    }

    async fn execute(&self, args: Value, ctx: &ToolContext) -> Result<Value, ToolError> {
        let query = require_param!(args, "query", String);
        let limit = require_param!(args, "limit", Option<usize>);
        if limit == Some(0) {
            return Err(ToolError::invalid_params("limit must be at least 1"));
        }

        let max_rows = ctx.budget.clamp_rows(limit);
        let output = ctx.db.safe_query(&query, max_rows).await?;

        Ok(serde_json::to_value(output)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::security::OutputBudget;
    use roster_db::{NewEmployee, RosterDb};
    use tempfile::TempDir;

    async fn context(max_rows: usize) -> (TempDir, ToolContext) {
        let tmp = TempDir::new().unwrap();
        let db = RosterDb::open(tmp.path().join("roster.sqlite3")).await.unwrap();
        for name in ["Ada", "Grace", "Linus"] {
            db.create_employee(&NewEmployee::new(name)).await.unwrap();
        }
        (tmp, ToolContext::new(db, OutputBudget::new(1024 * 1024, max_rows)))
    }

    #[tokio::test]
    async fn test_safe_query_accepts_select() {
        let (_tmp, ctx) = context(100).await;

        let out = SafeQueryTool
            .execute(json!({"query": "SELECT name FROM employees ORDER BY id"}), &ctx)
            .await
            .unwrap();
        assert_eq!(out["row_count"], 3);
        assert_eq!(out["columns"][0]["name"], "name");
        assert_eq!(out["rows"][2][0], "Linus");
        assert_eq!(out["truncated"], false);
    }

    #[tokio::test]
    async fn test_safe_query_row_budget() {
        let (_tmp, ctx) = context(2).await;

        let out = SafeQueryTool
            .execute(json!({"query": "SELECT * FROM employees"}), &ctx)
            .await
            .unwrap();
        assert_eq!(out["row_count"], 2);
        assert_eq!(out["truncated"], true);

        let out = SafeQueryTool
            .execute(json!({"query": "SELECT * FROM employees", "limit": 1}), &ctx)
            .await
            .unwrap();
        assert_eq!(out["row_count"], 1);
    }

    #[tokio::test]
    async fn test_safe_query_refusals() {
        let (_tmp, ctx) = context(100).await;

        let cases = [
            ("DROP TABLE employees", "UnsafeOperation"),
            ("SELECT 1; DELETE FROM employees", "StackedQueryRejected"),
            ("WITH x AS (SELECT 1) SELECT * FROM x", "NotAReadQuery"),
            ("   ", "EmptyQuery"),
        ];
        for (sql, kind) in cases {
            let err = SafeQueryTool
                .execute(json!({"query": sql}), &ctx)
                .await
                .unwrap_err();
            assert_eq!(err.kind(), kind, "{sql}");
        }

        let err = SafeQueryTool.execute(json!({}), &ctx).await.unwrap_err();
        assert_eq!(err.kind(), "InvalidParams");

        assert_eq!(ctx.db.list_employees(None).await.unwrap().len(), 3);
    }
}
