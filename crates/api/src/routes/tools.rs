//! Tool descriptor listing

use axum::Json;

use crate::mcp::{catalog::operation_catalog, types::ToolsListResult};

/// Describe every operation as a tool
pub async fn list_tools() -> Json<ToolsListResult> {
    Json(ToolsListResult {
        tools: operation_catalog(),
        next_cursor: None,
    })
}
