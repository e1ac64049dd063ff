//! Tool Registry - Tool Discovery and Dispatch
//!
//! Maintains the list of available tools and dispatches calls by name.

use super::*;
use std::collections::HashMap;
use tracing::debug;

/// Registry of available MCP tools
pub struct ToolRegistry {
    tools: HashMap<&'static str, Box<dyn McpTool>>,
}

impl ToolRegistry {
    /// Create a new tool registry with all tools registered
    pub fn new() -> Self {
        let mut registry = Self {
            tools: HashMap::new(),
        };

        registry.register(Box::new(ListEmployeesTool));
        registry.register(Box::new(GetEmployeeTool));
        registry.register(Box::new(SearchEmployeesTool));
        registry.register(Box::new(ListDepartmentsTool));
        registry.register(Box::new(EmployeeStatsTool));
        registry.register(Box::new(SafeQueryTool));

        debug!("Registered {} tools", registry.tools.len());

        registry
    }

    fn register(&mut self, tool: Box<dyn McpTool>) {
        debug!("Registering tool: {}", tool.name());
        self.tools.insert(tool.name(), tool);
    }

    /// Tool definitions, sorted by name
    pub fn list_tools(&self) -> Vec<ToolDefinition> {
        let mut tools: Vec<_> = self.tools.values().map(|t| t.definition()).collect();
        tools.sort_by(|a, b| a.name.cmp(&b.name));
        tools
    }

    /// Call a tool by name
    pub async fn call_tool(
        &self,
        name: &str,
        args: Value,
        ctx: &ToolContext,
    ) -> Result<Value, ToolError> {
        let tool = self
            .tools
            .get(name)
            .ok_or_else(|| ToolError::UnknownTool(name.to_string()))?;

        tool.execute(args, ctx).await
    }

    pub fn has_tool(&self, name: &str) -> bool {
        self.tools.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.tools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }
}

impl Default for ToolRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_registry_has_read_tools() {
        let registry = ToolRegistry::new();

        assert_eq!(registry.len(), 6);
        for name in [
            "list_employees",
            "get_employee",
            "search_employees",
            "list_departments",
            "get_employee_stats",
            "safe_query",
        ] {
            assert!(registry.has_tool(name), "missing tool {name}");
        }
    }

    #[test]
    fn test_tool_schemas_are_objects() {
        let registry = ToolRegistry::new();

        for tool in registry.list_tools() {
            assert!(!tool.description.is_empty(), "{} has no description", tool.name);
            assert_eq!(tool.input_schema["type"], "object", "{}", tool.name);
        }
    }

    #[test]
    fn test_list_tools_is_sorted() {
        let names: Vec<_> = ToolRegistry::new()
            .list_tools()
            .into_iter()
            .map(|t| t.name)
            .collect();
        let mut sorted = names.clone();
        sorted.sort();
        assert_eq!(names, sorted);
    }
}
