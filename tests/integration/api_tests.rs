//! Callback API integration tests.
//!
//! Exercises every callback route through the router over the in-memory
//! store, asserting the unified envelope and each endpoint's payload shape.
//! Signature verification has its own suite; these tests run against an
//! unverified router so the payloads stay in focus.

use axum::body::Body;
use axum::http::{Method, Request, StatusCode};
use tower::ServiceExt;

use super::test_utils::{body_json, unverified_router};

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

fn post_json(uri: &str, body: &str) -> Request<Body> {
    Request::builder()
        .method(Method::POST)
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

// =============================================================================
// File Metadata
// =============================================================================

#[tokio::test]
async fn test_file_info_payload() {
    let router = unverified_router();

    let response = router.oneshot(get("/v3/3rd/files/42")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response.into_body()).await;
    assert_eq!(json["code"], 0);
    assert_eq!(json["message"], "");

    let data = &json["data"];
    assert_eq!(data["id"], "42");
    assert_eq!(data["name"], "file_42.docx");
    assert_eq!(data["version"], 1);
    assert_eq!(
        data["download_url"],
        "https://example.com/files/42/download"
    );
    assert!(data["create_time"].is_u64());
    assert!(data["modify_time"].is_u64());
}

#[tokio::test]
async fn test_download_info_embeds_session_token() {
    let router = unverified_router();

    let request = Request::builder()
        .uri("/v3/3rd/files/42/download")
        .header("x-weboffice-token", "tok-abc")
        .body(Body::empty())
        .unwrap();

    let response = router.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response.into_body()).await;
    let url = json["data"]["download_url"].as_str().unwrap();
    assert!(url.contains("token=tok-abc"));
}

#[tokio::test]
async fn test_permission_payload() {
    let router = unverified_router();

    let response = router
        .oneshot(get("/v3/3rd/files/42/permission?user_id=user_007"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response.into_body()).await;
    let data = &json["data"];
    assert_eq!(data["read"], true);
    assert_eq!(data["write"], true);
    assert_eq!(data["history"], true);
}

#[tokio::test]
async fn test_history_starts_with_single_version() {
    let router = unverified_router();

    let response = router
        .oneshot(get("/v3/3rd/files/42/history"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response.into_body()).await;
    let history = json["data"]["history"].as_array().unwrap();
    assert_eq!(history.len(), 1);
    assert_eq!(history[0]["version"], 1);
}

#[tokio::test]
async fn test_version_info_payload_and_bounds() {
    let router = unverified_router();

    let response = router
        .clone()
        .oneshot(get("/v3/3rd/files/42/versions/1"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response.into_body()).await;
    assert_eq!(json["data"]["version"], 1);
    assert!(json["data"]["download_url"]
        .as_str()
        .unwrap()
        .contains("/versions/1/"));

    // Version 7 was never created.
    let response = router
        .oneshot(get("/v3/3rd/files/42/versions/7"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let json = body_json(response.into_body()).await;
    assert_eq!(json["code"], 40400);
}

#[tokio::test]
async fn test_edit_info_payload() {
    let router = unverified_router();

    let response = router.oneshot(get("/v3/3rd/files/42/edit")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response.into_body()).await;
    let data = &json["data"];
    assert_eq!(data["file_id"], "42");
    assert!(data["download_url"].is_string());
    assert!(data["user_id"].is_string());
    // User-scoped permissions omit the history flag.
    assert!(data["permission"]["history"].is_null());
    assert_eq!(data["permission"]["write"], true);
}

// =============================================================================
// Save Flows
// =============================================================================

#[tokio::test]
async fn test_three_phase_save_flow() {
    let router = unverified_router();

    // Phase 1: announce the save, get an upload slot.
    let response = router
        .clone()
        .oneshot(post_json(
            "/v3/3rd/files/doc/save",
            r#"{"size": 2048, "md5": "abc"}"#,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response.into_body()).await;
    let upload_id = json["data"]["upload_id"].as_str().unwrap().to_string();
    assert!(json["data"]["upload_url"]
        .as_str()
        .unwrap()
        .ends_with(&upload_id));
    assert!(json["data"]["expire_time"].is_u64());

    // Phase 3: content uploaded, commit.
    let notify = format!(r#"{{"upload_id": "{}", "size": 2048}}"#, upload_id);
    let response = router
        .clone()
        .oneshot(post_json("/v3/3rd/files/doc/save/notify", &notify))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response.into_body()).await;
    assert_eq!(json["data"]["file_id"], "doc");
    assert_eq!(json["data"]["version"], 2);

    // File metadata reflects the new version.
    let response = router.oneshot(get("/v3/3rd/files/doc")).await.unwrap();
    let json = body_json(response.into_body()).await;
    assert_eq!(json["data"]["version"], 2);
}

#[tokio::test]
async fn test_begin_save_accepts_empty_body() {
    let router = unverified_router();

    let request = Request::builder()
        .method(Method::POST)
        .uri("/v3/3rd/files/doc/save")
        .body(Body::empty())
        .unwrap();

    let response = router.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response.into_body()).await;
    assert!(json["data"]["upload_id"].is_string());
}

#[tokio::test]
async fn test_save_notify_rejects_unknown_upload_id() {
    let router = unverified_router();

    let response = router
        .oneshot(post_json(
            "/v3/3rd/files/doc/save/notify",
            r#"{"upload_id": "does-not-exist"}"#,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let json = body_json(response.into_body()).await;
    assert_eq!(json["code"], 40000);
}

#[tokio::test]
async fn test_single_phase_save() {
    let router = unverified_router();

    let request = Request::builder()
        .method(Method::PUT)
        .uri("/v3/3rd/files/doc/content")
        .header("content-type", "application/octet-stream")
        .body(Body::from(vec![0u8; 64]))
        .unwrap();

    let response = router.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response.into_body()).await;
    assert_eq!(json["data"]["file_id"], "doc");
    assert_eq!(json["data"]["version"], 2);
}

#[tokio::test]
async fn test_single_phase_save_rejects_empty_body() {
    let router = unverified_router();

    let request = Request::builder()
        .method(Method::PUT)
        .uri("/v3/3rd/files/doc/content")
        .body(Body::empty())
        .unwrap();

    let response = router.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let json = body_json(response.into_body()).await;
    assert_eq!(json["code"], 40000);
}

// =============================================================================
// Users
// =============================================================================

#[tokio::test]
async fn test_user_info_payload() {
    let router = unverified_router();

    let response = router.oneshot(get("/v3/3rd/users/u1")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response.into_body()).await;
    let data = &json["data"];
    assert_eq!(data["id"], "u1");
    assert_eq!(data["name"], "User u1");
    assert!(data["avatar_url"].as_str().unwrap().contains("u1"));
    assert_eq!(data["permission"]["read"], true);
}

#[tokio::test]
async fn test_users_batch_payload() {
    let router = unverified_router();

    let response = router
        .oneshot(post_json(
            "/v3/3rd/users/batch",
            r#"{"user_ids": ["u1", "u2", "u3"]}"#,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response.into_body()).await;
    let users = json["data"]["users"].as_array().unwrap();
    assert_eq!(users.len(), 3);
    assert_eq!(users[0]["id"], "u1");
    // Batch responses omit per-user permissions.
    assert!(users[0]["permission"].is_null());
}

#[tokio::test]
async fn test_users_batch_rejects_empty_list() {
    let router = unverified_router();

    let response = router
        .oneshot(post_json("/v3/3rd/users/batch", r#"{"user_ids": []}"#))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let json = body_json(response.into_body()).await;
    assert_eq!(json["code"], 40000);
}

// =============================================================================
// Envelope and Fallback
// =============================================================================

#[tokio::test]
async fn test_success_envelope_shape() {
    let router = unverified_router();

    let response = router.oneshot(get("/v3/3rd/files/42")).await.unwrap();
    let json = body_json(response.into_body()).await;

    assert_eq!(json["code"], 0);
    assert_eq!(json["message"], "");
    assert!(json["data"].is_object());
}

#[tokio::test]
async fn test_unknown_route_returns_envelope_404() {
    let router = unverified_router();

    let response = router.oneshot(get("/v3/3rd/nope")).await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let json = body_json(response.into_body()).await;
    assert_eq!(json["code"], 40400);
    assert_eq!(json["message"], "Not found");
    assert!(json["data"].is_null());
}

#[tokio::test]
async fn test_health_payload() {
    let router = unverified_router();

    let response = router.oneshot(get("/health")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response.into_body()).await;
    assert_eq!(json["status"], "ok");
    assert_eq!(json["service"], "weboffice-callback");
    assert!(json["version"].is_string());
}
