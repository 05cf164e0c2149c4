//! Router configuration for the callback service.
//!
//! This module wires the callback handlers into an Axum router and decides,
//! at registration time, whether the WPS-2 signature middleware wraps the
//! protected callback root. The verifier itself never consults configuration;
//! a deployment that disables verification simply never attaches it.
//!
//! # Route Structure
//!
//! ```text
//! /health          - Health check (public)
//! /v3/3rd/files/*  - File callbacks (protected)
//! /v3/3rd/users/*  - User callbacks (protected)
//! ```
//!
//! # Example
//!
//! ```ignore
//! use weboffice_callback::server::routes::{create_router, RouterConfig};
//! use weboffice_callback::store::MemoryStore;
//!
//! let config = RouterConfig::new("my-app-id", "my-app-secret");
//! let router = create_router(MemoryStore::default(), config);
//!
//! let listener = tokio::net::TcpListener::bind("0.0.0.0:3001").await?;
//! axum::serve(listener, router).await?;
//! ```

use std::time::Duration;

use axum::{
    middleware,
    routing::{get, post, put},
    Router,
};
use http::header::{HeaderName, AUTHORIZATION, CONTENT_TYPE, DATE};
use http::Method;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::store::CallbackStore;

use super::auth::{auth_middleware, SignatureVerifier};
use super::handlers::{
    begin_save_handler, download_handler, edit_info_handler, file_info_handler, health_handler,
    history_handler, not_found_handler, permission_handler, save_content_handler,
    save_notify_handler, user_info_handler, users_batch_handler, version_info_handler, AppState,
};

/// Path prefix under which every protected callback lives.
pub const CALLBACK_ROOT: &str = "/v3/3rd";

// =============================================================================
// Router Configuration
// =============================================================================

/// Configuration for the HTTP router.
#[derive(Clone)]
pub struct RouterConfig {
    /// Application identifier the platform signs requests with
    pub app_id: String,

    /// Shared application secret
    pub app_secret: String,

    /// Whether the signature middleware is attached to the callback root
    pub verify_signatures: bool,

    /// Reject body-bearing requests lacking a `Content-MD5` header
    pub strict_content_md5: bool,

    /// Allowed CORS origins (None = allow any origin)
    pub cors_origins: Option<Vec<String>>,

    /// Whether to enable request tracing
    pub enable_tracing: bool,
}

impl RouterConfig {
    /// Create a configuration with signature verification enabled.
    ///
    /// By default:
    /// - Strict checksum mode is off (reference behavior)
    /// - CORS allows any origin
    /// - Tracing is enabled
    pub fn new(app_id: impl Into<String>, app_secret: impl Into<String>) -> Self {
        Self {
            app_id: app_id.into(),
            app_secret: app_secret.into(),
            verify_signatures: true,
            strict_content_md5: false,
            cors_origins: None,
            enable_tracing: true,
        }
    }

    /// Create a configuration with signature verification disabled.
    ///
    /// **Warning**: This should only be used for development/testing.
    pub fn without_verification() -> Self {
        Self {
            app_id: String::new(),
            app_secret: String::new(),
            verify_signatures: false,
            strict_content_md5: false,
            cors_origins: None,
            enable_tracing: true,
        }
    }

    /// Reject body-bearing requests that omit `Content-MD5`.
    pub fn with_strict_content_md5(mut self, strict: bool) -> Self {
        self.strict_content_md5 = strict;
        self
    }

    /// Set specific allowed CORS origins.
    pub fn with_cors_origins(mut self, origins: Vec<String>) -> Self {
        self.cors_origins = Some(origins);
        self
    }

    /// Enable or disable request tracing.
    pub fn with_tracing(mut self, enabled: bool) -> Self {
        self.enable_tracing = enabled;
        self
    }
}

// =============================================================================
// Router Builder
// =============================================================================

/// Create the main application router.
///
/// Builds the complete Axum router with the callback routes under
/// [`CALLBACK_ROOT`], the public health check, the envelope-shaped 404
/// fallback, CORS, and optional request tracing.
pub fn create_router<S>(store: S, config: RouterConfig) -> Router
where
    S: CallbackStore + 'static,
{
    let state = AppState::new(store);
    let cors = build_cors_layer(&config);

    let mut callback_routes = callback_routes(state);

    if config.verify_signatures {
        let verifier = SignatureVerifier::new(&config.app_id, &config.app_secret)
            .with_strict_content_md5(config.strict_content_md5);
        callback_routes =
            callback_routes.layer(middleware::from_fn_with_state(verifier, auth_middleware));
    }

    let router = Router::new()
        .nest(CALLBACK_ROOT, callback_routes)
        .route("/health", get(health_handler))
        .fallback(not_found_handler)
        .layer(cors);

    if config.enable_tracing {
        router.layer(TraceLayer::new_for_http())
    } else {
        router
    }
}

/// The protected callback routes, relative to [`CALLBACK_ROOT`].
fn callback_routes<S>(state: AppState<S>) -> Router
where
    S: CallbackStore + 'static,
{
    Router::new()
        .route("/files/{file_id}", get(file_info_handler::<S>))
        .route("/files/{file_id}/download", get(download_handler::<S>))
        .route("/files/{file_id}/permission", get(permission_handler::<S>))
        .route("/files/{file_id}/history", get(history_handler::<S>))
        .route(
            "/files/{file_id}/versions/{version}",
            get(version_info_handler::<S>),
        )
        .route("/files/{file_id}/save", post(begin_save_handler::<S>))
        .route(
            "/files/{file_id}/save/notify",
            post(save_notify_handler::<S>),
        )
        .route("/files/{file_id}/content", put(save_content_handler::<S>))
        .route("/files/{file_id}/edit", get(edit_info_handler::<S>))
        .route("/users/{user_id}", get(user_info_handler::<S>))
        .route("/users/batch", post(users_batch_handler::<S>))
        .with_state(state)
}

/// Build the CORS layer based on configuration.
fn build_cors_layer(config: &RouterConfig) -> CorsLayer {
    let cors = CorsLayer::new()
        .allow_methods([
            Method::GET,
            Method::HEAD,
            Method::POST,
            Method::PUT,
            Method::OPTIONS,
        ])
        .allow_headers([
            AUTHORIZATION,
            CONTENT_TYPE,
            DATE,
            HeaderName::from_static("content-md5"),
            HeaderName::from_static("x-weboffice-token"),
        ])
        .max_age(Duration::from_secs(86400));

    match &config.cors_origins {
        None => cors.allow_origin(Any),
        Some(origins) if origins.is_empty() => cors,
        Some(origins) => {
            let parsed_origins: Vec<_> = origins.iter().filter_map(|o| o.parse().ok()).collect();
            cors.allow_origin(parsed_origins)
        }
    }
}

// =============================================================================
// Convenience Functions
// =============================================================================

/// Create a development router with signature verification disabled.
///
/// **Warning**: Only for local development and testing.
pub fn create_dev_router<S>(store: S) -> Router
where
    S: CallbackStore + 'static,
{
    create_router(store, RouterConfig::without_verification())
}

// =============================================================================
// Tests
// =============================================================================
