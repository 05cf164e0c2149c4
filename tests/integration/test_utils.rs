//! Test utilities for integration tests.
//!
//! Helpers for building routers over the in-memory store and for
//! constructing correctly signed WPS-2 requests.

use axum::body::Body;
use axum::http::{Method, Request};
use axum::Router;
use http_body_util::BodyExt;

use weboffice_callback::{create_router, MemoryStore, RouterConfig, SignatureVerifier};

pub const TEST_APP_ID: &str = "SX-test-app";
pub const TEST_SECRET: &str = "test-app-secret-for-wps2-signing";
pub const TEST_DATE: &str = "Mon, 01 Jan 2024 00:00:00 GMT";

/// Router with signature verification enabled over a fresh in-memory store.
pub fn verified_router() -> Router {
    create_router(
        MemoryStore::default(),
        RouterConfig::new(TEST_APP_ID, TEST_SECRET).with_tracing(false),
    )
}

/// Router with signature verification enabled and strict Content-MD5 mode.
pub fn strict_router() -> Router {
    create_router(
        MemoryStore::default(),
        RouterConfig::new(TEST_APP_ID, TEST_SECRET)
            .with_strict_content_md5(true)
            .with_tracing(false),
    )
}

/// Router with signature verification disabled.
pub fn unverified_router() -> Router {
    create_router(
        MemoryStore::default(),
        RouterConfig::without_verification().with_tracing(false),
    )
}

/// The verifier tests sign requests with.
pub fn test_verifier() -> SignatureVerifier {
    SignatureVerifier::new(TEST_APP_ID, TEST_SECRET)
}

/// Build a correctly signed bodyless request (GET/HEAD) for `uri`.
pub fn signed_get(uri: &str) -> Request<Body> {
    let authorization =
        test_verifier().authorization_header(&SignatureVerifier::uri_checksum(uri), "", TEST_DATE);

    Request::builder()
        .method(Method::GET)
        .uri(uri)
        .header("date", TEST_DATE)
        .header("authorization", authorization)
        .body(Body::empty())
        .unwrap()
}

/// Build a correctly signed JSON request with the given method and body.
///
/// Signs with an empty checksum and no Content-MD5 header, the platform's
/// degraded mode for body-bearing requests.
pub fn signed_json(method: Method, uri: &str, body: &str) -> Request<Body> {
    let authorization =
        test_verifier().authorization_header("", "application/json", TEST_DATE);

    Request::builder()
        .method(method)
        .uri(uri)
        .header("date", TEST_DATE)
        .header("content-type", "application/json")
        .header("authorization", authorization)
        .body(Body::from(body.to_string()))
        .unwrap()
}

/// Build a correctly signed raw-body PUT with the given content type.
pub fn signed_put(uri: &str, content_type: &str, body: Vec<u8>) -> Request<Body> {
    let authorization = test_verifier().authorization_header("", content_type, TEST_DATE);

    Request::builder()
        .method(Method::PUT)
        .uri(uri)
        .header("date", TEST_DATE)
        .header("content-type", content_type)
        .header("authorization", authorization)
        .body(Body::from(body))
        .unwrap()
}

/// Collect a response body into parsed JSON.
pub async fn body_json(body: Body) -> serde_json::Value {
    let bytes = body.collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}
