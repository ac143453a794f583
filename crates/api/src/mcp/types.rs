//! Tool descriptor types, shaped after the MCP `tools/list` result

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// An operation published to the tool-exposure adapter
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Tool {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub input_schema: Value,
    /// Absent for operations that return no body
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output_schema: Option<Value>,
    pub http: HttpBinding,
    /// Whether the call needs `Authorization: Bearer <token>`
    pub requires_auth: bool,
}

/// Where the adapter forwards a call
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HttpBinding {
    pub method: String,
    pub path: String,
}

/// Response of `GET /tools`
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolsListResult {
    pub tools: Vec<Tool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next_cursor: Option<String>,
}
