//! Toolgate API Library
//!
//! HTTP service that registers accounts, issues signed bearer tokens and
//! answers authenticated queries, optionally backed by Google Drive search.

pub mod auth;
pub mod config;
pub mod error;
pub mod extract;
pub mod mcp;
pub mod routes;
pub mod search;
pub mod state;

pub use config::Config;
pub use error::{ApiError, ApiResult};
pub use routes::create_router;
pub use state::AppState;
