//! WPS-2 request signature verification.
//!
//! Every callback the WebOffice platform makes to this service carries an
//! `Authorization` header of the form:
//!
//! ```text
//! Authorization: WPS-2:AppId:HexDigest
//! ```
//!
//! The digest is computed over a signing string assembled from the shared
//! application secret and request attributes, concatenated without separators:
//!
//! ```text
//! digest = SHA1(app_secret + content_checksum + content_type + date)
//! ```
//!
//! The content checksum is the `Content-MD5` header when present. For
//! bodyless reads (GET/HEAD) without that header it is the lowercase MD5 hex
//! of the full request URI (path + query, exactly as received). Body-bearing
//! requests without a `Content-MD5` header use an empty checksum unless
//! strict checksum mode is enabled, in which case they are rejected.
//!
//! # Security Properties
//!
//! - **Shared-secret binding**: Only a caller holding the application secret
//!   can produce a valid digest.
//! - **Case-insensitive hex**: Digest comparison decodes both sides to raw
//!   bytes, so an uppercase digest still verifies.
//! - **Constant-time comparison**: Digest verification uses constant-time
//!   comparison to prevent timing attacks.
//!
//! # Example
//!
//! ```rust
//! use axum::http::{HeaderMap, HeaderValue, Method};
//! use weboffice_callback::server::auth::SignatureVerifier;
//!
//! let verifier = SignatureVerifier::new("my-app", "my-secret");
//!
//! let date = "Mon, 01 Jan 2024 00:00:00 GMT";
//! let uri = "/v3/3rd/files/42";
//! let authorization = verifier.authorization_header(
//!     &SignatureVerifier::uri_checksum(uri), "", date);
//!
//! let mut headers = HeaderMap::new();
//! headers.insert("date", HeaderValue::from_static(date));
//! headers.insert("authorization", HeaderValue::from_str(&authorization).unwrap());
//!
//! assert!(verifier.verify(&Method::GET, uri, &headers).is_ok());
//! ```

use axum::{
    extract::{OriginalUri, Request, State},
    http::{header, HeaderMap, Method, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use md5::Md5;
use sha1::{Digest, Sha1};
use subtle::ConstantTimeEq;
use tracing::{debug, warn};

use super::response::{Envelope, CODE_AUTH_FAILED};

/// Scheme literal carried in the first field of the `Authorization` header.
pub const WPS2_SCHEME: &str = "WPS-2";

/// Header carrying the caller-supplied body checksum.
const CONTENT_MD5: &str = "content-md5";

// =============================================================================
// Errors
// =============================================================================

/// Signature verification error types.
///
/// All variants are terminal for the request and map to HTTP 401.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthError {
    /// `date` or `authorization` header is missing
    MissingHeaders,

    /// `authorization` header is not `WPS-2:AppId:Digest`
    MalformedAuthorization,

    /// AppId field does not match the configured application identifier
    IdentityMismatch,

    /// Computed digest does not match the supplied digest
    SignatureMismatch,

    /// Body-bearing request without `Content-MD5` in strict checksum mode
    MissingContentChecksum,
}

impl std::fmt::Display for AuthError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AuthError::MissingHeaders => {
                write!(f, "Missing required headers for signature verification")
            }
            AuthError::MalformedAuthorization => write!(f, "Invalid authorization format"),
            AuthError::IdentityMismatch => write!(f, "AppId mismatch"),
            AuthError::SignatureMismatch => write!(f, "Signature verification failed"),
            AuthError::MissingContentChecksum => {
                write!(f, "Missing Content-MD5 header for request body")
            }
        }
    }
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        // Signature and identity failures could indicate an attack, log at
        // warn. Missing or malformed headers are usually misconfigured
        // callers, log at debug.
        match &self {
            AuthError::SignatureMismatch | AuthError::IdentityMismatch => {
                warn!(status = 401, "Authentication failed: {}", self);
            }
            _ => {
                debug!(status = 401, "Authentication failed: {}", self);
            }
        }

        let body = Envelope::error(CODE_AUTH_FAILED, self.to_string());
        (StatusCode::UNAUTHORIZED, Json(body)).into_response()
    }
}

// =============================================================================
// Signature Verifier
// =============================================================================

/// Verifier for the WPS-2 request signature scheme.
///
/// Holds the provisioned application credential. Verification is a pure
/// function of the request and this credential; the verifier keeps no other
/// state and is safe to share across concurrent requests.
#[derive(Clone)]
pub struct SignatureVerifier {
    /// Configured application identifier
    app_id: String,

    /// Application secret, never logged or echoed
    secret: Vec<u8>,

    /// Reject body-bearing requests that omit `Content-MD5`
    require_content_md5: bool,
}

impl SignatureVerifier {
    /// Create a verifier for the given application credential.
    pub fn new(app_id: impl Into<String>, secret: impl AsRef<[u8]>) -> Self {
        Self {
            app_id: app_id.into(),
            secret: secret.as_ref().to_vec(),
            require_content_md5: false,
        }
    }

    /// Reject body-bearing requests without a `Content-MD5` header instead
    /// of degrading to an empty checksum.
    ///
    /// The reference behavior is to degrade; strict mode is opt-in.
    pub fn with_strict_content_md5(mut self, strict: bool) -> Self {
        self.require_content_md5 = strict;
        self
    }

    /// Verify a request against the configured credential.
    ///
    /// `uri` must be the full target as received on the wire (path plus query
    /// string, un-decoded); the URI participates in the checksum for bodyless
    /// reads.
    pub fn verify(
        &self,
        method: &Method,
        uri: &str,
        headers: &HeaderMap,
    ) -> Result<(), AuthError> {
        let date = header_str(headers, header::DATE.as_str());
        let authorization = header_str(headers, header::AUTHORIZATION.as_str());

        let (date, authorization) = match (date, authorization) {
            (Some(d), Some(a)) => (d, a),
            _ => return Err(AuthError::MissingHeaders),
        };

        let fields: Vec<&str> = authorization.split(':').collect();
        if fields.len() != 3 || fields[0] != WPS2_SCHEME {
            return Err(AuthError::MalformedAuthorization);
        }

        if fields[1] != self.app_id {
            return Err(AuthError::IdentityMismatch);
        }

        let checksum = self.content_checksum(method, uri, headers)?;
        let content_type = header_str(headers, header::CONTENT_TYPE.as_str()).unwrap_or("");

        let expected = self.compute_digest(&checksum, content_type, date);

        // Decoding the supplied hex makes the comparison case-insensitive.
        // Anything that is not valid hex can never match.
        let provided = hex::decode(fields[2]).map_err(|_| AuthError::SignatureMismatch)?;

        if provided.ct_eq(expected.as_slice()).into() {
            Ok(())
        } else {
            Err(AuthError::SignatureMismatch)
        }
    }

    /// Derive the checksum component of the signing string.
    ///
    /// Precedence: `Content-MD5` header verbatim, then MD5 of the URI for
    /// bodyless reads, then the empty string (or rejection in strict mode).
    fn content_checksum(
        &self,
        method: &Method,
        uri: &str,
        headers: &HeaderMap,
    ) -> Result<String, AuthError> {
        if let Some(checksum) = header_str(headers, CONTENT_MD5) {
            return Ok(checksum.to_string());
        }

        if is_read_method(method) {
            return Ok(Self::uri_checksum(uri));
        }

        if self.require_content_md5 {
            return Err(AuthError::MissingContentChecksum);
        }

        Ok(String::new())
    }

    /// Compute the raw SHA-1 digest of the signing string.
    fn compute_digest(&self, checksum: &str, content_type: &str, date: &str) -> [u8; 20] {
        let mut hasher = Sha1::new();
        hasher.update(&self.secret);
        hasher.update(checksum.as_bytes());
        hasher.update(content_type.as_bytes());
        hasher.update(date.as_bytes());
        hasher.finalize().into()
    }

    /// Produce a complete `Authorization` header value for the given signing
    /// components.
    ///
    /// Used by the `sign` CLI utility and by tests to build valid requests.
    pub fn authorization_header(&self, checksum: &str, content_type: &str, date: &str) -> String {
        let digest = hex::encode(self.compute_digest(checksum, content_type, date));
        format!("{}:{}:{}", WPS2_SCHEME, self.app_id, digest)
    }

    /// Lowercase MD5 hex of a request URI, the checksum used for bodyless reads.
    pub fn uri_checksum(uri: &str) -> String {
        hex::encode(Md5::digest(uri.as_bytes()))
    }

    /// The configured application identifier.
    pub fn app_id(&self) -> &str {
        &self.app_id
    }
}

/// A request method that carries no body for signing purposes.
fn is_read_method(method: &Method) -> bool {
    matches!(*method, Method::GET | Method::HEAD)
}

/// Fetch a header as a string, treating undecodable values as absent.
fn header_str<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers.get(name).and_then(|v| v.to_str().ok())
}

// =============================================================================
// Axum Middleware
// =============================================================================

/// Axum middleware for verifying WPS-2 request signatures.
///
/// Rejects unauthenticated requests with a 401 envelope response before the
/// route handler runs. Attach it only to protected routes; whether it is
/// attached at all is a route-registration decision, the verifier itself
/// never branches on configuration.
///
/// # Example
///
/// ```ignore
/// use axum::{middleware, routing::get, Router};
/// use weboffice_callback::server::auth::{auth_middleware, SignatureVerifier};
///
/// let verifier = SignatureVerifier::new("app-id", "app-secret");
/// let app = Router::new()
///     .route("/v3/3rd/files/{file_id}", get(file_info_handler))
///     .layer(middleware::from_fn_with_state(verifier, auth_middleware));
/// ```
pub async fn auth_middleware(
    State(verifier): State<SignatureVerifier>,
    OriginalUri(original_uri): OriginalUri,
    request: Request,
    next: Next,
) -> Result<Response, AuthError> {
    // The signing string uses the target exactly as received, including the
    // query string and without percent-decoding.
    let target = original_uri
        .path_and_query()
        .map(|pq| pq.as_str())
        .unwrap_or_else(|| original_uri.path());

    verifier.verify(request.method(), target, request.headers())?;

    Ok(next.run(request).await)
}

// =============================================================================
// Tests
// =============================================================================
