//! MCP tool catalog
//!
//! Toolgate does not speak MCP itself. It publishes a catalog of its HTTP
//! operations (name, input schema, output schema, HTTP binding) so an
//! external tool-exposure adapter can republish them to model-driven callers
//! via `tools/list` and forward `tools/call` to the matching route.
//!
//! ```text
//! Model client --> MCP adapter --GET /tools--> Toolgate
//!                             --POST /query (Bearer)-->
//! ```

pub mod catalog;
pub mod types;

pub use catalog::operation_catalog;
pub use types::*;
