//! Query endpoint

use axum::{
    extract::{Extension, State},
    Json,
};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    auth::AuthUser,
    error::{ApiError, ApiResult},
    extract::ApiJson,
    search::{SearchParams, SearchResults},
    state::AppState,
};

#[derive(Debug, Deserialize, JsonSchema)]
pub struct QueryRequest {
    /// Free-form request text
    pub text: String,
    /// Continue an earlier exchange; a new id is generated when absent
    #[serde(default)]
    pub conversation_id: Option<String>,
    /// Search Google Drive with these parameters
    #[serde(default)]
    pub search: Option<SearchParams>,
}

#[derive(Debug, Serialize, Deserialize, JsonSchema)]
pub struct QueryResponse {
    pub conversation_id: String,
    pub responses: Vec<String>,
    /// Search collaborator result, exactly as returned
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub search: Option<SearchResults>,
}

/// Answer a query directly, or delegate it to the search collaborator
pub async fn process_query(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    ApiJson(query): ApiJson<QueryRequest>,
) -> ApiResult<Json<QueryResponse>> {
    let conversation_id = query
        .conversation_id
        .filter(|id| !id.trim().is_empty())
        .unwrap_or_else(|| Uuid::new_v4().to_string());

    let Some(params) = query.search else {
        let text = query.text.trim();
        if text.is_empty() {
            return Err(ApiError::Validation("Query text must not be empty".to_string()));
        }

        return Ok(Json(QueryResponse {
            conversation_id,
            responses: vec![format!("Received query: {}", text)],
            search: None,
        }));
    };

    if params.query.trim().is_empty() {
        return Err(ApiError::Validation("Search query must not be empty".to_string()));
    }

    let provider = state.search.as_ref().ok_or(ApiError::SearchDisabled)?;

    tracing::info!(
        username = %auth_user.username(),
        conversation_id = %conversation_id,
        "query: Delegating to search collaborator"
    );

    let results = tokio::time::timeout(state.config.search_timeout(), provider.search(&params))
        .await
        .map_err(|_| {
            tracing::warn!(
                timeout_ms = state.config.search_timeout_ms,
                "query: Search collaborator timed out"
            );
            ApiError::UpstreamTimeout
        })??;

    Ok(Json(QueryResponse {
        conversation_id,
        responses: file_links(&results),
        search: Some(results),
    }))
}

/// One markdown link line per file that has a viewer URL; files without
/// one are still present in the raw search result
fn file_links(results: &SearchResults) -> Vec<String> {
    if results.files.is_empty() {
        return vec!["No matching files found.".to_string()];
    }

    results
        .files
        .iter()
        .filter_map(|file| {
            let link = file.web_view_link.as_ref()?;
            Some(format!("{}: [Click to view file]({})", file.name, link))
        })
        .collect()
}
