//! MCP Server Implementation
//!
//! JSON-RPC 2.0 over newline-delimited stdio. One line in, at most one line
//! out; each request is handled to completion before the next is read.
//!
//! # Example
//!
//! ```ignore
//! let db = RosterDb::open(path).await?;
//! let mut server = McpServer::new(db, McpServerConfig::default())?;
//! server.run().await?;
//! ```

use crate::protocol::{
    methods, ContentBlock, InitializeParams, InitializeResult, JsonRpcError, JsonRpcRequest,
    JsonRpcResponse, ListChangedCapability, RequestId, ResourceReadParams, ResourceReadResult,
    ResourcesListResult, ServerCapabilities, ServerInfo, ToolCallParams, ToolCallResult,
    ToolsListResult, JSONRPC_VERSION, MCP_PROTOCOL_VERSION,
};
use crate::resources;
use crate::security::{AuditLog, OutputBudget, SecurityConfig};
use crate::tools::{ToolContext, ToolRegistry};
use crate::ToolError;
use anyhow::{Context, Result};
use roster_db::RosterDb;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{json, Value};
use std::path::PathBuf;
use std::time::Instant;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt, BufReader};
use tracing::{debug, error, info, warn};

/// MCP Server configuration
#[derive(Debug, Clone)]
pub struct McpServerConfig {
    /// Server name (reported in initialize)
    pub server_name: String,

    /// Server version (reported in initialize)
    pub server_version: String,

    /// Maximum tool response size in bytes
    pub max_response_bytes: usize,

    /// Maximum rows returned from queries and resources
    pub max_rows: usize,

    /// Path to audit log file
    pub audit_log_path: Option<PathBuf>,
}

impl Default for McpServerConfig {
    fn default() -> Self {
        let budget = OutputBudget::default();
        Self {
            server_name: "roster-mcp".to_string(),
            server_version: env!("CARGO_PKG_VERSION").to_string(),
            max_response_bytes: budget.max_bytes(),
            max_rows: budget.max_rows(),
            audit_log_path: None,
        }
    }
}

/// MCP Server
pub struct McpServer {
    config: McpServerConfig,
    security: SecurityConfig,
    tools: ToolRegistry,
    ctx: ToolContext,
    initialized: bool,
}

impl McpServer {
    pub fn new(db: RosterDb, config: McpServerConfig) -> Result<Self> {
        let output_budget = OutputBudget::new(config.max_response_bytes, config.max_rows);
        let audit_log = config
            .audit_log_path
            .as_ref()
            .map(|p| AuditLog::new(p.clone()))
            .transpose()
            .context("Failed to open MCP audit log")?;

        let ctx = ToolContext::new(db, output_budget.clone());

        Ok(Self {
            config,
            security: SecurityConfig {
                output_budget,
                audit_log,
            },
            tools: ToolRegistry::new(),
            ctx,
            initialized: false,
        })
    }

    /// Serve on the process's stdin/stdout until stdin closes.
    pub async fn run(&mut self) -> Result<()> {
        let stdin = BufReader::new(tokio::io::stdin());
        let stdout = tokio::io::stdout();
        self.serve(stdin, stdout).await
    }

    /// Serve requests from `reader`, writing responses to `writer`, until EOF.
    pub async fn serve<R, W>(&mut self, reader: R, mut writer: W) -> Result<()>
    where
        R: AsyncBufRead + Unpin,
        W: AsyncWrite + Unpin,
    {
        info!(
            tools = self.tools.len(),
            audit = self.security.audit_log.is_some(),
            "MCP server starting"
        );

        let mut lines = reader.lines();
        while let Some(line) = lines.next_line().await.context("Failed to read request")? {
            if line.trim().is_empty() {
                continue;
            }

            if let Some(response) = self.handle_line(&line).await? {
                write_response(&mut writer, &response).await?;
            }
        }

        info!("MCP server shutting down");
        Ok(())
    }

    /// Handle one raw line. Notifications produce no response.
    pub async fn handle_line(&mut self, line: &str) -> Result<Option<JsonRpcResponse>> {
        debug!("Received: {}", line);

        let request: JsonRpcRequest = match serde_json::from_str(line) {
            Ok(request) => request,
            Err(e) => {
                warn!("Unparseable request: {}", e);
                let response = JsonRpcResponse::error(
                    RequestId::Null,
                    JsonRpcError::parse_error(format!("Invalid JSON: {}", e)),
                );
                self.audit_response(&response)?;
                return Ok(Some(response));
            }
        };

        if let Some(audit) = &self.security.audit_log {
            audit.log_request(&request)?;
        }

        let is_notification = request.is_notification();
        let response = self.handle_request(request).await;

        if is_notification {
            return Ok(None);
        }

        self.audit_response(&response)?;
        Ok(Some(response))
    }

    fn audit_response(&self, response: &JsonRpcResponse) -> Result<()> {
        if let Some(audit) = &self.security.audit_log {
            audit.log_response(response)?;
        }
        Ok(())
    }

    async fn handle_request(&mut self, request: JsonRpcRequest) -> JsonRpcResponse {
        let id = request.id.clone().unwrap_or_default();

        if request.jsonrpc != JSONRPC_VERSION {
            return JsonRpcResponse::error(
                id,
                JsonRpcError::invalid_request(format!(
                    "Invalid JSON-RPC version: {}",
                    request.jsonrpc
                )),
            );
        }

        match request.method.as_str() {
            methods::INITIALIZE => self.handle_initialize(id, request.params),
            methods::INITIALIZED => JsonRpcResponse::success(id, json!({})),
            methods::PING => JsonRpcResponse::success(id, json!({})),
            methods::TOOLS_LIST => to_response(
                id,
                &ToolsListResult {
                    tools: self.tools.list_tools(),
                },
            ),
            methods::TOOLS_CALL if !self.initialized => {
                JsonRpcResponse::error(id, JsonRpcError::not_initialized())
            }
            methods::TOOLS_CALL => self.handle_tools_call(id, request.params).await,
            methods::RESOURCES_LIST => to_response(
                id,
                &ResourcesListResult {
                    resources: resources::list_resources(),
                },
            ),
            methods::RESOURCES_READ if !self.initialized => {
                JsonRpcResponse::error(id, JsonRpcError::not_initialized())
            }
            methods::RESOURCES_READ => self.handle_resources_read(id, request.params).await,
            other => JsonRpcResponse::error(id, JsonRpcError::method_not_found(other)),
        }
    }

    fn handle_initialize(&mut self, id: RequestId, params: Option<Value>) -> JsonRpcResponse {
        let params: InitializeParams = match params
            .map(serde_json::from_value::<InitializeParams>)
            .transpose()
        {
            Ok(params) => params.unwrap_or_default(),
            Err(e) => {
                return JsonRpcResponse::error(
                    id,
                    JsonRpcError::invalid_params(format!("Invalid initialize params: {}", e)),
                );
            }
        };

        match &params.client_info {
            Some(client) => info!(
                "Initialize from {} v{} (protocol {})",
                client.name, client.version, params.protocol_version
            ),
            None => info!("Initialize (protocol {})", params.protocol_version),
        }

        self.initialized = true;

        let result = InitializeResult {
            protocol_version: MCP_PROTOCOL_VERSION.to_string(),
            capabilities: ServerCapabilities {
                tools: Some(ListChangedCapability {
                    list_changed: false,
                }),
                resources: Some(ListChangedCapability {
                    list_changed: false,
                }),
            },
            server_info: ServerInfo {
                name: self.config.server_name.clone(),
                version: self.config.server_version.clone(),
            },
        };

        to_response(id, &result)
    }

    async fn handle_tools_call(&self, id: RequestId, params: Option<Value>) -> JsonRpcResponse {
        let params: ToolCallParams = match parse_params(params, "tool call") {
            Ok(params) => params,
            Err(err) => return JsonRpcResponse::error(id, err),
        };

        info!(tool = %params.name, "Tool call");
        let start = Instant::now();
        let outcome = self
            .tools
            .call_tool(&params.name, params.arguments, &self.ctx)
            .await;
        let duration_ms = start.elapsed().as_millis() as u64;

        if let Some(audit) = &self.security.audit_log {
            let kind = outcome.as_ref().err().map(ToolError::kind);
            if let Err(e) = audit.log_tool_call(&params.name, kind, duration_ms) {
                error!("Failed to audit tool call: {}", e);
            }
        }

        let result = match outcome {
            Ok(value) => self.success_result(&value),
            Err(err @ ToolError::UnknownTool(_)) => {
                warn!("{}", err);
                return JsonRpcResponse::error(id, JsonRpcError::from_tool_error(&err));
            }
            Err(err) => {
                match &err {
                    ToolError::Db(roster_db::DbError::Storage(_))
                    | ToolError::Db(roster_db::DbError::Io(_))
                    | ToolError::Serialization(_) => {
                        error!(tool = %params.name, "Tool error: {}", err)
                    }
                    _ => warn!(tool = %params.name, kind = err.kind(), "Tool refused: {}", err),
                }
                error_result(&err)
            }
        };

        to_response(id, &result)
    }

    /// Wrap a tool value, swapping in a truncation notice when it is over budget.
    fn success_result(&self, value: &Value) -> ToolCallResult {
        let text = match serde_json::to_string(value) {
            Ok(text) => text,
            Err(e) => return error_result(&ToolError::Serialization(e)),
        };

        let budget = &self.security.output_budget;
        if let Err(e) = budget.check_size(text.len()) {
            warn!("{}", e);
            let notice = json!({
                "truncated": true,
                "max_bytes": budget.max_bytes(),
                "original_bytes": text.len(),
                "message": "Response exceeded size limit. Use a smaller limit or a narrower query.",
            });
            return ToolCallResult {
                content: vec![ContentBlock::text(notice.to_string())],
                is_error: true,
            };
        }

        ToolCallResult {
            content: vec![ContentBlock::text(text)],
            is_error: false,
        }
    }

    async fn handle_resources_read(&self, id: RequestId, params: Option<Value>) -> JsonRpcResponse {
        let params: ResourceReadParams = match parse_params(params, "resource read") {
            Ok(params) => params,
            Err(err) => return JsonRpcResponse::error(id, err),
        };

        debug!(uri = %params.uri, "Resource read");
        match resources::read_resource(&self.ctx.db, &params.uri, self.ctx.budget.max_rows()).await
        {
            Ok(contents) => to_response(
                id,
                &ResourceReadResult {
                    contents: vec![contents],
                },
            ),
            Err(err) => {
                warn!(uri = %params.uri, "Resource read failed: {}", err);
                JsonRpcResponse::error(id, JsonRpcError::from_tool_error(&err))
            }
        }
    }
}

fn parse_params<T: DeserializeOwned>(
    params: Option<Value>,
    what: &str,
) -> std::result::Result<T, JsonRpcError> {
    let params = params
        .ok_or_else(|| JsonRpcError::invalid_params(format!("Missing {} params", what)))?;
    serde_json::from_value(params)
        .map_err(|e| JsonRpcError::invalid_params(format!("Invalid {} params: {}", what, e)))
}

fn error_result(err: &ToolError) -> ToolCallResult {
    let body = json!({
        "error": {
            "kind": err.kind(),
            "message": err.to_string(),
        }
    });
    ToolCallResult {
        content: vec![ContentBlock::text(body.to_string())],
        is_error: true,
    }
}

fn to_response<T: Serialize>(id: RequestId, result: &T) -> JsonRpcResponse {
    match serde_json::to_value(result) {
        Ok(value) => JsonRpcResponse::success(id, value),
        Err(e) => {
            error!("Failed to serialize response: {}", e);
            JsonRpcResponse::error(
                id,
                JsonRpcError::internal_error("Failed to serialize response"),
            )
        }
    }
}

async fn write_response<W: AsyncWrite + Unpin>(
    writer: &mut W,
    response: &JsonRpcResponse,
) -> Result<()> {
    let json = serde_json::to_string(response)?;
    debug!("Sending: {}", json);
    writer.write_all(json.as_bytes()).await?;
    writer.write_all(b"\n").await?;
    writer.flush().await?;
    Ok(())
}
