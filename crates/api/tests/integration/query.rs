//! Query endpoint, with and without the search collaborator

use std::{sync::Arc, time::Duration};

use axum::http::{Method, StatusCode};
use serde_json::json;

use toolgate_api::search::{SearchFile, SearchResults};

use crate::common::{app, app_with, body_json, send, test_config, token_for, StubSearch};

fn budget_results() -> SearchResults {
    SearchResults {
        files: vec![SearchFile {
            id: "file123".to_string(),
            name: "budget.pdf".to_string(),
            mime_type: Some("application/pdf".to_string()),
            web_view_link: Some("https://drive.google.com/file/d/file123/view".to_string()),
        }],
        next_page_token: Some("next-2".to_string()),
    }
}

#[tokio::test]
async fn test_query_requires_auth() {
    let app = app();
    let response = send(&app, Method::POST, "/query", None, Some(json!({ "text": "hello" }))).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_direct_query() {
    let app = app();
    let token = token_for(&app, "alice", "s3cret!").await;

    let response = send(
        &app,
        Method::POST,
        "/query",
        Some(&token),
        Some(json!({ "text": "hello", "conversation_id": "conv-1" })),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["conversation_id"], "conv-1");
    assert_eq!(body["responses"].as_array().unwrap().len(), 1);
    assert!(body.get("search").is_none());

    // New conversation id when none is given
    let response = send(&app, Method::POST, "/query", Some(&token), Some(json!({ "text": "hi" }))).await;
    let body = body_json(response).await;
    assert!(!body["conversation_id"].as_str().unwrap().is_empty());
}

#[tokio::test]
async fn test_empty_query_rejected() {
    let app = app();
    let token = token_for(&app, "alice", "s3cret!").await;

    let response = send(&app, Method::POST, "/query", Some(&token), Some(json!({ "text": "   " }))).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_search_when_disabled() {
    let app = app();
    let token = token_for(&app, "alice", "s3cret!").await;

    let response = send(
        &app,
        Method::POST,
        "/query",
        Some(&token),
        Some(json!({ "text": "find it", "search": { "query": "budget" } })),
    )
    .await;
    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(body_json(response).await["error"]["code"], "SEARCH_DISABLED");
}

#[tokio::test]
async fn test_search_results_passed_through() {
    let app = app_with(test_config(), Some(Arc::new(StubSearch::Found(budget_results()))));
    let token = token_for(&app, "alice", "s3cret!").await;

    let response = send(
        &app,
        Method::POST,
        "/query",
        Some(&token),
        Some(json!({ "text": "find it", "search": { "query": "budget", "page_size": 5 } })),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;

    let expected = serde_json::to_value(budget_results()).unwrap();
    assert_eq!(body["search"], expected);
    assert_eq!(
        body["responses"][0],
        "budget.pdf: [Click to view file](https://drive.google.com/file/d/file123/view)"
    );
}

#[tokio::test]
async fn test_empty_search_terms_rejected() {
    let app = app_with(test_config(), Some(Arc::new(StubSearch::Found(budget_results()))));
    let token = token_for(&app, "alice", "s3cret!").await;

    let response = send(
        &app,
        Method::POST,
        "/query",
        Some(&token),
        Some(json!({ "text": "find it", "search": { "query": " " } })),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_search_timeout() {
    let app = app_with(
        test_config(),
        Some(Arc::new(StubSearch::Stalls(Duration::from_secs(5)))),
    );
    let token = token_for(&app, "alice", "s3cret!").await;

    let response = send(
        &app,
        Method::POST,
        "/query",
        Some(&token),
        Some(json!({ "text": "find it", "search": { "query": "budget" } })),
    )
    .await;
    assert_eq!(response.status(), StatusCode::GATEWAY_TIMEOUT);
    assert_eq!(body_json(response).await["error"]["code"], "UPSTREAM_TIMEOUT");
}

#[tokio::test]
async fn test_search_upstream_failure() {
    let mut config = test_config();
    config.debug = true;
    let app = app_with(config, Some(Arc::new(StubSearch::Fails("Drive API returned 500"))));
    let token = token_for(&app, "alice", "s3cret!").await;

    let response = send(
        &app,
        Method::POST,
        "/query",
        Some(&token),
        Some(json!({ "text": "find it", "search": { "query": "budget" } })),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
    let body = body_json(response).await;
    assert_eq!(body["error"]["code"], "UPSTREAM_FAILURE");
    assert!(body["error"]["detail"].as_str().unwrap().contains("500"));
}
