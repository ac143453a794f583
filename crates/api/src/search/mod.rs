//! External search collaborator
//!
//! The query endpoint only sees [`SearchProvider`]; the Google Drive client
//! is one implementation and tests inject stubs.

pub mod drive;

use std::sync::Arc;

use async_trait::async_trait;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::config::Config;

pub use drive::{DriveCredentials, DriveSearchClient};

/// Default number of results per page
pub const DEFAULT_PAGE_SIZE: u32 = 10;

/// Search request, passed through verbatim from the query payload
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct SearchParams {
    /// Free-text search terms
    pub query: String,
    /// Number of results to return (default: 10)
    #[serde(default)]
    pub page_size: Option<u32>,
    /// Token for pagination
    #[serde(default)]
    pub page_token: Option<String>,
}

/// A file returned by the search collaborator
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct SearchFile {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub mime_type: Option<String>,
    #[serde(default)]
    pub web_view_link: Option<String>,
}

/// Search results with files and next page token
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct SearchResults {
    #[serde(default)]
    pub files: Vec<SearchFile>,
    #[serde(default)]
    pub next_page_token: Option<String>,
}

/// Narrow interface to an external file search service
#[async_trait]
pub trait SearchProvider: Send + Sync {
    async fn search(&self, params: &SearchParams) -> Result<SearchResults, SearchError>;
}

/// Build the Drive provider when a credentials file is configured.
///
/// A configured but unusable credentials file is an error, not a silent
/// fallback to "search disabled".
pub fn provider_from_config(
    config: &Config,
) -> Result<Option<Arc<dyn SearchProvider>>, SearchError> {
    let Some(path) = &config.google_drive_credentials else {
        tracing::info!("Google Drive credentials not configured, search disabled");
        return Ok(None);
    };

    let credentials = DriveCredentials::from_file(path)?;
    let client = DriveSearchClient::new(
        config.google_drive_api_url.clone(),
        credentials,
        config.search_timeout(),
    )?;

    tracing::info!(credentials = %path.display(), "Google Drive search enabled");
    Ok(Some(Arc::new(client)))
}

#[derive(Debug, thiserror::Error)]
pub enum SearchError {
    #[error("Search request timed out")]
    Timeout,
    #[error("Search service error: {0}")]
    Upstream(String),
    #[error("Search credentials unusable: {0}")]
    Credentials(String),
}

impl From<reqwest::Error> for SearchError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            SearchError::Timeout
        } else {
            SearchError::Upstream(err.to_string())
        }
    }
}
