//! HTTP layer for the WebOffice callback service.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                         HTTP Layer                              │
//! │             /v3/3rd/files/*   /v3/3rd/users/*                   │
//! │                                                                 │
//! │  ┌─────────────┐  ┌─────────────┐  ┌─────────────────────────┐  │
//! │  │    auth     │  │  handlers   │  │        routes           │  │
//! │  │   (WPS-2)   │  │ (envelope)  │  │   (router config)       │  │
//! │  └─────────────┘  └─────────────┘  └─────────────────────────┘  │
//! └─────────────────────────────────────────────────────────────────┘
//! ```

pub mod auth;
pub mod handlers;
pub mod response;
pub mod routes;

pub use auth::{auth_middleware, AuthError, SignatureVerifier, WPS2_SCHEME};
pub use handlers::{health_handler, AppState, HealthResponse, HistoryResponse, UsersResponse};
pub use response::{
    Envelope, CODE_AUTH_FAILED, CODE_INTERNAL, CODE_INVALID_REQUEST, CODE_NOT_FOUND, CODE_OK,
};
pub use routes::{create_dev_router, create_router, RouterConfig, CALLBACK_ROOT};
