//! Unified JSON response envelope.
//!
//! Every handler answers with the same shape the WebOffice platform expects:
//!
//! ```json
//! { "code": 0, "message": "", "data": { ... } }
//! ```
//!
//! `code = 0` signals success; any nonzero value is an application-level
//! error code, independent of the HTTP status the layer also sets.

use serde::Serialize;

// Application-level error codes understood by the platform.

/// Success.
pub const CODE_OK: i64 = 0;

/// Malformed or semantically invalid request.
pub const CODE_INVALID_REQUEST: i64 = 40000;

/// Signature verification failure.
pub const CODE_AUTH_FAILED: i64 = 40001;

/// Requested entity does not exist.
pub const CODE_NOT_FOUND: i64 = 40400;

/// Unexpected internal fault.
pub const CODE_INTERNAL: i64 = 50000;

/// The unified response envelope.
#[derive(Debug, Serialize)]
pub struct Envelope<T = serde_json::Value> {
    /// Application-level result code (0 = success)
    pub code: i64,

    /// Human-readable message, empty on success
    pub message: String,

    /// Payload, omitted on errors
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
}

impl<T: Serialize> Envelope<T> {
    /// Wrap a successful payload.
    pub fn success(data: T) -> Self {
        Self {
            code: CODE_OK,
            message: String::new(),
            data: Some(data),
        }
    }
}

impl Envelope<serde_json::Value> {
    /// Build an error envelope with no payload.
    pub fn error(code: i64, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            data: None,
        }
    }
}

// =============================================================================
// Tests
// =============================================================================
