//! Audit Logging - MCP Request Recording
//!
//! Append-only NDJSON, one line per request, response and tool call:
//!
//! ```json
//! {"type":"request","ts":"2026-01-21T10:30:00Z","method":"tools/call","id":"1","params_summary":"{keys: [arguments, name]}"}
//! {"type":"tool_call","ts":"2026-01-21T10:30:00Z","tool":"safe_query","success":false,"error_kind":"UnsafeOperation","duration_ms":0}
//! {"type":"response","ts":"2026-01-21T10:30:00Z","id":"1","success":true}
//! ```
//!
//! Argument values are never written, only their keys.

use super::SecurityError;
use crate::protocol::{JsonRpcRequest, JsonRpcResponse, RequestId};
use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::Value;
use std::fs::{File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

#[derive(Debug)]
pub struct AuditLog {
    path: PathBuf,
    writer: Mutex<BufWriter<File>>,
}

impl AuditLog {
    /// Open (or create) the log for appending.
    pub fn new(path: PathBuf) -> Result<Self, SecurityError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| {
                SecurityError::AuditError(format!("Failed to create audit log directory: {}", e))
            })?;
        }

        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .map_err(|e| SecurityError::AuditError(format!("Failed to open audit log: {}", e)))?;

        Ok(Self {
            path,
            writer: Mutex::new(BufWriter::new(file)),
        })
    }

    pub fn log_request(&self, request: &JsonRpcRequest) -> Result<(), SecurityError> {
        self.write_entry(&AuditEntry::Request {
            ts: Utc::now(),
            method: &request.method,
            id: request.id.as_ref().map(format_id),
            params_summary: request.params.as_ref().map(summarize_params),
        })
    }

    pub fn log_response(&self, response: &JsonRpcResponse) -> Result<(), SecurityError> {
        self.write_entry(&AuditEntry::Response {
            ts: Utc::now(),
            id: format_id(&response.id),
            success: response.error.is_none(),
            error_code: response.error.as_ref().map(|e| e.code),
        })
    }

    pub fn log_tool_call(
        &self,
        tool: &str,
        error_kind: Option<&str>,
        duration_ms: u64,
    ) -> Result<(), SecurityError> {
        self.write_entry(&AuditEntry::ToolCall {
            ts: Utc::now(),
            tool,
            success: error_kind.is_none(),
            error_kind,
            duration_ms,
        })
    }

    fn write_entry(&self, entry: &AuditEntry<'_>) -> Result<(), SecurityError> {
        let json = serde_json::to_string(entry).map_err(|e| {
            SecurityError::AuditError(format!("Failed to serialize audit entry: {}", e))
        })?;

        let mut writer = self
            .writer
            .lock()
            .map_err(|e| SecurityError::AuditError(format!("Failed to lock audit log: {}", e)))?;

        writeln!(writer, "{}", json)
            .and_then(|_| writer.flush())
            .map_err(|e| SecurityError::AuditError(format!("Failed to write audit entry: {}", e)))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[derive(Debug, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum AuditEntry<'a> {
    Request {
        ts: DateTime<Utc>,
        method: &'a str,
        #[serde(skip_serializing_if = "Option::is_none")]
        id: Option<String>,
        #[serde(skip_serializing_if = "Option::is_none")]
        params_summary: Option<String>,
    },
    Response {
        ts: DateTime<Utc>,
        id: String,
        success: bool,
        #[serde(skip_serializing_if = "Option::is_none")]
        error_code: Option<i32>,
    },
    ToolCall {
        ts: DateTime<Utc>,
        tool: &'a str,
        success: bool,
        #[serde(skip_serializing_if = "Option::is_none")]
        error_kind: Option<&'a str>,
        duration_ms: u64,
    },
}

fn format_id(id: &RequestId) -> String {
    match id {
        RequestId::String(s) => s.clone(),
        RequestId::Number(n) => n.to_string(),
        RequestId::Null => "null".to_string(),
    }
}

fn summarize_params(params: &Value) -> String {
    match params {
        Value::Object(map) => {
            let mut keys: Vec<&str> = map.keys().map(String::as_str).collect();
            keys.sort_unstable();
            format!("{{keys: [{}]}}", keys.join(", "))
        }
        Value::Array(items) => format!("[{} items]", items.len()),
        _ => "[value]".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::JsonRpcError;
    use serde_json::json;
    use tempfile::TempDir;

    fn read_lines(path: &Path) -> Vec<Value> {
        std::fs::read_to_string(path)
            .unwrap()
            .lines()
            .map(|line| serde_json::from_str(line).unwrap())
            .collect()
    }

    #[test]
    fn test_audit_log_creates_parent_dirs() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("nested").join("audit.ndjson");

        let log = AuditLog::new(path.clone()).unwrap();
        assert!(path.exists());
        assert_eq!(log.path(), path.as_path());
    }

    #[test]
    fn test_audit_entries_are_ndjson() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("audit.ndjson");
        let log = AuditLog::new(path.clone()).unwrap();

        let request = JsonRpcRequest {
            jsonrpc: "2.0".to_string(),
            id: Some(RequestId::Number(7)),
            method: "tools/call".to_string(),
            params: Some(json!({"name": "safe_query", "arguments": {"query": "SELECT 1"}})),
        };
        log.log_request(&request).unwrap();
        log.log_tool_call("safe_query", Some("UnsafeOperation"), 3).unwrap();
        log.log_response(&JsonRpcResponse::error(
            RequestId::Number(7),
            JsonRpcError::internal_error("boom"),
        ))
        .unwrap();

        let lines = read_lines(&path);
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0]["type"], "request");
        assert_eq!(lines[0]["id"], "7");
        assert_eq!(lines[0]["params_summary"], "{keys: [arguments, name]}");
        assert_eq!(lines[1]["type"], "tool_call");
        assert_eq!(lines[1]["success"], false);
        assert_eq!(lines[1]["error_kind"], "UnsafeOperation");
        assert_eq!(lines[2]["success"], false);
        assert_eq!(lines[2]["error_code"], -32603);

        // Argument values stay out of the log.
        assert!(!std::fs::read_to_string(&path).unwrap().contains("SELECT 1"));
    }

    #[test]
    fn test_summarize_params() {
        assert_eq!(summarize_params(&json!([1, 2, 3])), "[3 items]");
        assert_eq!(summarize_params(&json!("x")), "[value]");
    }
}
