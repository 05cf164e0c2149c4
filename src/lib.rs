//! # WebOffice Callback Service
//!
//! A callback HTTP service for the WPS WebOffice document-editing platform.
//! The platform calls back into this service for file metadata, download and
//! upload coordination, and user metadata; every protected request is
//! authenticated with the WPS-2 shared-secret signature scheme before any
//! handler runs.
//!
//! ## Features
//!
//! - **WPS-2 signature verification**: SHA-1 digest over
//!   secret + checksum + content-type + date, with constant-time,
//!   case-insensitive comparison
//! - **Unified envelope**: every response is `{code, message, data}`
//! - **Pluggable store**: callbacks are thin adapters over the
//!   [`store::CallbackStore`] trait; an in-memory reference implementation
//!   is included
//!
//! ## Architecture
//!
//! - [`server`] - Axum-based HTTP layer: auth middleware, handlers, routes
//! - [`store`] - File/user store trait and the in-memory reference store
//! - [`config`] - CLI and configuration types
//! - [`error`] - Store error types
//!
//! ## Example
//!
//! ```rust,no_run
//! use weboffice_callback::{create_router, MemoryStore, RouterConfig};
//!
//! #[tokio::main]
//! async fn main() {
//!     let config = RouterConfig::new("my-app-id", "my-app-secret");
//!     let router = create_router(MemoryStore::default(), config);
//!
//!     let listener = tokio::net::TcpListener::bind("0.0.0.0:3001").await.unwrap();
//!     axum::serve(listener, router).await.unwrap();
//! }
//! ```

pub mod config;
pub mod error;
pub mod server;
pub mod store;

// Re-export commonly used types
pub use config::{Cli, Command, ServeConfig, SignConfig, SignOutputFormat};
pub use error::StoreError;
pub use server::{
    auth_middleware, create_dev_router, create_router, AppState, AuthError, Envelope,
    HealthResponse, RouterConfig, SignatureVerifier, CALLBACK_ROOT, WPS2_SCHEME,
};
pub use store::{
    CallbackStore, DownloadInfo, EditInfo, FileInfo, FileVersion, MemoryStore, Permission,
    SaveNotifyRequest, SaveReceipt, SaveRequest, SaveSlot, UserInfo, VersionInfo,
};
