//! Registration, login and self-service account flows

use axum::{
    body::Body,
    http::{header, Method, Request, StatusCode},
};
use jsonwebtoken::Algorithm;
use serde_json::json;
use time::{Duration, OffsetDateTime};
use tower::ServiceExt;

use toolgate_api::auth::{hash_password, JwtManager};
use toolgate_shared::{MemoryUserRepository, User, UserProfile, UserRepository};

use crate::common::{
    app, app_over, app_with, body_json, login, register, send, send_raw, test_config, token_for,
    SECRET,
};

#[tokio::test]
async fn test_account_lifecycle() {
    let app = app();

    let response = register(&app, "alice", "s3cret!").await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let created = body_json(response).await;
    assert_eq!(created["username"], "alice");
    assert_eq!(created["is_active"], true);
    assert!(created.get("password").is_none());
    assert!(created.get("password_hash").is_none());

    let response = login(&app, "alice", "s3cret!").await;
    assert_eq!(response.status(), StatusCode::OK);
    let issued = body_json(response).await;
    assert_eq!(issued["token_type"], "bearer");
    assert_eq!(issued["expires_in"], 30 * 60);
    let token = issued["access_token"].as_str().unwrap().to_string();

    let response = send(&app, Method::GET, "/users/me", Some(&token), None).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["username"], "alice");

    let response = send(&app, Method::DELETE, "/users/me", Some(&token), None).await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    // Token is still well-formed but the account is gone
    let response = send(&app, Method::GET, "/users/me", Some(&token), None).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let response = login(&app, "alice", "s3cret!").await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_duplicate_registration_conflicts() {
    let app = app();

    assert_eq!(register(&app, "alice", "s3cret!").await.status(), StatusCode::CREATED);

    let response = register(&app, "alice", "different").await;
    assert_eq!(response.status(), StatusCode::CONFLICT);
    assert_eq!(body_json(response).await["error"]["code"], "CONFLICT");

    // Original password still works
    assert_eq!(login(&app, "alice", "s3cret!").await.status(), StatusCode::OK);
    assert_eq!(
        login(&app, "alice", "different").await.status(),
        StatusCode::UNAUTHORIZED
    );
}

#[tokio::test]
async fn test_registration_validation() {
    let app = app();

    assert_eq!(register(&app, "", "s3cret!").await.status(), StatusCode::BAD_REQUEST);
    assert_eq!(register(&app, "al ice", "s3cret!").await.status(), StatusCode::BAD_REQUEST);
    assert_eq!(register(&app, "alice", "").await.status(), StatusCode::BAD_REQUEST);

    let response = send(
        &app,
        Method::POST,
        "/register",
        None,
        Some(json!({ "username": "alice", "password": "s3cret!", "email": "not-an-email" })),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["error"]["code"], "VALIDATION_ERROR");
}

#[tokio::test]
async fn test_wrong_password_and_unknown_user_look_the_same() {
    let app = app();
    register(&app, "alice", "s3cret!").await;

    let wrong = login(&app, "alice", "guess").await;
    assert_eq!(wrong.status(), StatusCode::UNAUTHORIZED);
    let wrong = body_json(wrong).await;

    let unknown = login(&app, "mallory", "guess").await;
    assert_eq!(unknown.status(), StatusCode::UNAUTHORIZED);
    let unknown = body_json(unknown).await;

    assert_eq!(wrong, unknown);
    assert_eq!(wrong["error"]["code"], "INVALID_CREDENTIALS");
}

#[tokio::test]
async fn test_login_accepts_form_body() {
    let app = app();
    register(&app, "alice", "s3cret!").await;

    let request = Request::builder()
        .method(Method::POST)
        .uri("/login")
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
        .body(Body::from("username=alice&password=s3cret%21"))
        .unwrap();
    let response = app.clone().oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert!(body["access_token"].as_str().is_some());
}

#[tokio::test]
async fn test_missing_token_is_challenged() {
    let app = app();

    let response = send(&app, Method::GET, "/users/me", None, None).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(
        response.headers().get(header::WWW_AUTHENTICATE).unwrap(),
        "Bearer"
    );
    assert_eq!(body_json(response).await["error"]["code"], "UNAUTHORIZED");
}

#[tokio::test]
async fn test_garbage_and_foreign_tokens_rejected() {
    let app = app();
    register(&app, "alice", "s3cret!").await;

    let response = send(&app, Method::GET, "/users/me", Some("not.a.jwt"), None).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(body_json(response).await["error"]["code"], "INVALID_TOKEN");

    // Token minted by a server with another secret
    let mut other_config = test_config();
    other_config.secret_key = "a-completely-different-secret-value-xyz".to_string();
    let other = app_with(other_config, None);
    let foreign = token_for(&other, "alice", "s3cret!").await;

    let response = send(&app, Method::GET, "/users/me", Some(&foreign), None).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_unknown_route_is_not_found_without_token() {
    let app = app();
    let response = send(&app, Method::GET, "/no-such-route", None, None).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_partial_profile_update() {
    let app = app();
    let token = token_for(&app, "alice", "s3cret!").await;

    let response = send(
        &app,
        Method::PATCH,
        "/users/me",
        Some(&token),
        Some(json!({ "email": "alice@example.com", "display_name": "Alice" })),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let updated = body_json(response).await;
    assert_eq!(updated["email"], "alice@example.com");
    assert_eq!(updated["display_name"], "Alice");

    // Only the display name changes; email is kept
    let response = send(
        &app,
        Method::PUT,
        "/users/me",
        Some(&token),
        Some(json!({ "display_name": "Alice L." })),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let updated = body_json(response).await;
    assert_eq!(updated["email"], "alice@example.com");
    assert_eq!(updated["display_name"], "Alice L.");

    let response = send(
        &app,
        Method::PATCH,
        "/users/me",
        Some(&token),
        Some(json!({ "email": "nope" })),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_password_change_takes_effect() {
    let app = app();
    let token = token_for(&app, "alice", "s3cret!").await;

    let response = send(
        &app,
        Method::PATCH,
        "/users/me",
        Some(&token),
        Some(json!({ "password": "n3w-s3cret" })),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);

    assert_eq!(login(&app, "alice", "s3cret!").await.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(login(&app, "alice", "n3w-s3cret").await.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_list_users_requires_auth() {
    let app = app();
    let token = token_for(&app, "alice", "s3cret!").await;
    register(&app, "bob", "hunter2").await;

    assert_eq!(
        send(&app, Method::GET, "/users", None, None).await.status(),
        StatusCode::UNAUTHORIZED
    );

    let response = send(&app, Method::GET, "/users", Some(&token), None).await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["total"], 2);
    let names: Vec<&str> = body["users"]
        .as_array()
        .unwrap()
        .iter()
        .map(|u| u["username"].as_str().unwrap())
        .collect();
    assert!(names.contains(&"alice"));
    assert!(names.contains(&"bob"));
    assert!(!body.to_string().contains("password"));
}

#[tokio::test]
async fn test_error_detail_only_in_debug() {
    let quiet = app();
    let body = body_json(send(&quiet, Method::GET, "/users/me", Some("x.y.z"), None).await).await;
    assert!(body["error"].get("detail").is_none());

    let mut config = test_config();
    config.debug = true;
    let verbose = app_with(config, None);
    let body = body_json(send(&verbose, Method::GET, "/users/me", Some("x.y.z"), None).await).await;
    assert_eq!(body["error"]["code"], "INVALID_TOKEN");
    assert!(body["error"]["detail"].as_str().is_some());
}

#[tokio::test]
async fn test_tools_catalog_is_public() {
    let app = app();

    let response = send(&app, Method::GET, "/tools", None, None).await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    let tools = body["tools"].as_array().unwrap();
    assert_eq!(tools.len(), 7);

    let query = tools.iter().find(|t| t["name"] == "query").unwrap();
    assert_eq!(query["requiresAuth"], true);
    assert_eq!(query["http"]["method"], "POST");
    assert_eq!(query["http"]["path"], "/query");
    assert_eq!(query["inputSchema"]["type"], "object");
}

#[tokio::test]
async fn test_health_endpoints() {
    let app = app();

    let response = send(&app, Method::GET, "/health", None, None).await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["search_enabled"], false);

    assert_eq!(
        send(&app, Method::GET, "/health/live", None, None).await.status(),
        StatusCode::OK
    );
    assert_eq!(
        send(&app, Method::GET, "/health/ready", None, None).await.status(),
        StatusCode::OK
    );
}

#[tokio::test]
async fn test_malformed_bodies_get_error_envelope() {
    let app = app();

    let response = send(
        &app,
        Method::POST,
        "/register",
        None,
        Some(json!({ "username": "alice" })),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_json(response).await;
    assert_eq!(body["error"]["code"], "BAD_REQUEST");
    assert!(body["error"]["message"].as_str().unwrap().contains("password"));

    let response = send_raw(&app, Method::POST, "/register", None, "{not json").await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["error"]["code"], "BAD_REQUEST");

    let token = token_for(&app, "alice", "s3cret!").await;
    let response = send_raw(&app, Method::PATCH, "/users/me", Some(&token), r#"{"email": 5}"#).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["error"]["code"], "BAD_REQUEST");

    let response = send_raw(&app, Method::POST, "/login", None, r#"{"username": "alice"}"#).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["error"]["code"], "BAD_REQUEST");
}

#[tokio::test]
async fn test_disabled_account_is_forbidden() {
    let repository = MemoryUserRepository::new();
    let app = app_over(repository.clone(), test_config(), None);
    let token = token_for(&app, "carol", "s3cret!").await;

    let mut carol = repository.get("carol").await.unwrap().unwrap();
    carol.is_active = false;
    repository.update(&carol).await.unwrap();

    let mut dave = User::new("dave", hash_password("hunter2").unwrap(), UserProfile::default());
    dave.is_active = false;
    repository.insert(&dave).await.unwrap();

    let response = send(&app, Method::GET, "/users/me", Some(&token), None).await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    assert_eq!(body_json(response).await["error"]["code"], "ACCOUNT_DISABLED");

    for (username, password) in [("carol", "s3cret!"), ("dave", "hunter2")] {
        let response = login(&app, username, password).await;
        assert_eq!(response.status(), StatusCode::FORBIDDEN);
        assert_eq!(body_json(response).await["error"]["code"], "ACCOUNT_DISABLED");
    }

    // A disabled account still needs the right password to learn it is disabled
    assert_eq!(login(&app, "dave", "guess").await.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_expired_token_looks_like_garbage() {
    let app = app();
    register(&app, "alice", "s3cret!").await;

    let jwt = JwtManager::new(SECRET, Algorithm::HS256, Duration::minutes(30));
    let expired = jwt
        .issue_at(
            "alice",
            Duration::minutes(30),
            OffsetDateTime::now_utc() - Duration::hours(1),
        )
        .unwrap();

    let response = send(&app, Method::GET, "/users/me", Some(&expired.token), None).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(
        response.headers().get(header::WWW_AUTHENTICATE).unwrap(),
        "Bearer"
    );
    let expired_body = body_json(response).await;

    let response = send(&app, Method::GET, "/users/me", Some("not.a.jwt"), None).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(expired_body, body_json(response).await);

    // A fresh token from the same manager is accepted
    let fresh = jwt.issue("alice", Duration::minutes(5)).unwrap();
    let response = send(&app, Method::GET, "/users/me", Some(&fresh.token), None).await;
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_oversized_token_lifetime_fails_without_crashing() {
    let mut config = test_config();
    config.access_token_expire_minutes = 10_000_000_000;
    let app = app_with(config, None);

    assert_eq!(register(&app, "alice", "s3cret!").await.status(), StatusCode::CREATED);

    let response = login(&app, "alice", "s3cret!").await;
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body_json(response).await["error"]["code"], "INTERNAL_ERROR");

    // Server keeps answering
    let response = send(&app, Method::GET, "/health/live", None, None).await;
    assert_eq!(response.status(), StatusCode::OK);
}
