//! Google Drive search client

use std::{fmt, path::Path, time::Duration};

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;

use super::{SearchError, SearchParams, SearchProvider, SearchResults, DEFAULT_PAGE_SIZE};

/// Drive caps `pageSize` at 1000
const MAX_PAGE_SIZE: u32 = 1000;

/// Only the fields we hand back to callers
const FILE_FIELDS: &str = "nextPageToken,files(id,name,mimeType,webViewLink)";

/// OAuth token file as written by the Google token helper.
/// Extra fields (`refresh_token`, `scope`, `id_token`, ...) are ignored.
#[derive(Clone, Deserialize)]
pub struct DriveCredentials {
    access_token: String,
}

impl DriveCredentials {
    pub fn new(access_token: impl Into<String>) -> Self {
        Self {
            access_token: access_token.into(),
        }
    }

    /// Load credentials from a token JSON file
    pub fn from_file(path: &Path) -> Result<Self, SearchError> {
        let raw = std::fs::read_to_string(path).map_err(|e| {
            SearchError::Credentials(format!("cannot read {}: {}", path.display(), e))
        })?;

        let credentials: DriveCredentials = serde_json::from_str(&raw).map_err(|e| {
            SearchError::Credentials(format!("cannot parse {}: {}", path.display(), e))
        })?;

        if credentials.access_token.trim().is_empty() {
            return Err(SearchError::Credentials(format!(
                "{} has an empty access_token",
                path.display()
            )));
        }
        Ok(credentials)
    }
}

impl fmt::Debug for DriveCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DriveCredentials")
            .field("access_token", &"<redacted>")
            .finish()
    }
}

/// Calls the Drive v3 `files.list` endpoint
pub struct DriveSearchClient {
    http: Client,
    base_url: String,
    credentials: DriveCredentials,
}

impl DriveSearchClient {
    pub fn new(
        base_url: impl Into<String>,
        credentials: DriveCredentials,
        timeout: Duration,
    ) -> Result<Self, SearchError> {
        let http = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| SearchError::Upstream(format!("HTTP client setup failed: {}", e)))?;

        Ok(Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            credentials,
        })
    }
}

/// Translate free text into a Drive `q` expression
fn drive_query(terms: &str) -> String {
    let escaped = terms.trim().replace('\\', "\\\\").replace('\'', "\\'");
    format!("fullText contains '{}' and trashed = false", escaped)
}

#[async_trait]
impl SearchProvider for DriveSearchClient {
    async fn search(&self, params: &SearchParams) -> Result<SearchResults, SearchError> {
        let page_size = params
            .page_size
            .unwrap_or(DEFAULT_PAGE_SIZE)
            .clamp(1, MAX_PAGE_SIZE);

        let mut query = vec![
            ("q", drive_query(&params.query)),
            ("pageSize", page_size.to_string()),
            ("fields", FILE_FIELDS.to_string()),
        ];
        if let Some(page_token) = &params.page_token {
            query.push(("pageToken", page_token.clone()));
        }

        tracing::debug!(page_size, "Searching Google Drive");

        let response = self
            .http
            .get(format!("{}/drive/v3/files", self.base_url))
            .bearer_auth(&self.credentials.access_token)
            .query(&query)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let snippet: String = body.chars().take(200).collect();
            tracing::warn!(status = %status, "Google Drive search failed");
            return Err(SearchError::Upstream(format!(
                "Drive API returned {}: {}",
                status, snippet
            )));
        }

        Ok(response.json::<SearchResults>().await?)
    }
}
