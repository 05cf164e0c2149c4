//! HTTP request handlers for the WebOffice callback API.
//!
//! All handlers are thin adapters over a [`CallbackStore`]: they pull
//! parameters and the optional `x-weboffice-token` header out of the request,
//! call the store, and wrap the result in the unified envelope.
//!
//! # Endpoints
//!
//! ```text
//! GET  /v3/3rd/files/{file_id}                    - File metadata
//! GET  /v3/3rd/files/{file_id}/download           - Download URL
//! GET  /v3/3rd/files/{file_id}/permission         - Permission flags
//! GET  /v3/3rd/files/{file_id}/history            - Version history
//! GET  /v3/3rd/files/{file_id}/versions/{version} - One version
//! POST /v3/3rd/files/{file_id}/save               - Begin three-phase save
//! POST /v3/3rd/files/{file_id}/save/notify        - Finish three-phase save
//! PUT  /v3/3rd/files/{file_id}/content            - Single-phase save
//! GET  /v3/3rd/files/{file_id}/edit               - Edit info
//! GET  /v3/3rd/users/{user_id}                    - User metadata
//! POST /v3/3rd/users/batch                        - Batch user metadata
//! GET  /health                                    - Health check (public)
//! ```

use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use bytes::Bytes;
use serde::{Deserialize, Serialize};
use tracing::{debug, error, warn};

use crate::error::StoreError;
use crate::store::{
    CallbackStore, DownloadInfo, EditInfo, FileInfo, FileVersion, Permission, SaveNotifyRequest,
    SaveReceipt, SaveRequest, SaveSlot, UserInfo, VersionInfo,
};

use super::response::{Envelope, CODE_INTERNAL, CODE_INVALID_REQUEST, CODE_NOT_FOUND};

/// Header the platform uses to carry the per-session file token.
const WEBOFFICE_TOKEN: &str = "x-weboffice-token";

// =============================================================================
// Application State
// =============================================================================

/// Shared application state handed to every handler.
pub struct AppState<S: CallbackStore> {
    /// The backing store
    pub store: Arc<S>,
}

impl<S: CallbackStore> AppState<S> {
    /// Create application state around the given store.
    pub fn new(store: S) -> Self {
        Self {
            store: Arc::new(store),
        }
    }
}

impl<S: CallbackStore> Clone for AppState<S> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
        }
    }
}

// =============================================================================
// Request Parameters
// =============================================================================

/// Query parameters for the permission endpoint.
#[derive(Debug, Deserialize)]
pub struct PermissionQueryParams {
    /// User whose permissions are requested
    #[serde(default)]
    pub user_id: Option<String>,
}

/// Path parameters for the version-info endpoint.
#[derive(Debug, Deserialize)]
pub struct VersionPathParams {
    pub file_id: String,
    pub version: u32,
}

/// Body of the batch user lookup.
#[derive(Debug, Deserialize)]
pub struct UsersBatchRequest {
    #[serde(default)]
    pub user_ids: Vec<String>,
}

// =============================================================================
// Response Types
// =============================================================================

/// Health check response.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    /// Service status
    pub status: String,

    /// Service name
    pub service: String,

    /// Service version
    pub version: String,
}

/// Payload wrapper for the history endpoint.
#[derive(Debug, Serialize)]
pub struct HistoryResponse {
    pub history: Vec<FileVersion>,
}

/// Payload wrapper for the batch user endpoint.
#[derive(Debug, Serialize)]
pub struct UsersResponse {
    pub users: Vec<UserInfo>,
}

// =============================================================================
// Error Mapping
// =============================================================================

/// Convert StoreError to an HTTP response.
///
/// 4xx outcomes are logged at debug/warn, 5xx at error. Error bodies carry
/// the envelope code the platform expects and never include store internals
/// beyond the error message.
impl IntoResponse for StoreError {
    fn into_response(self) -> Response {
        let (status, code) = match &self {
            StoreError::NotFound(_) => (StatusCode::NOT_FOUND, CODE_NOT_FOUND),
            StoreError::InvalidRequest(_) => (StatusCode::BAD_REQUEST, CODE_INVALID_REQUEST),
            StoreError::Unavailable(_) => (StatusCode::INTERNAL_SERVER_ERROR, CODE_INTERNAL),
        };

        match &self {
            StoreError::NotFound(_) => {
                debug!(status = status.as_u16(), "Resource not found: {}", self);
            }
            StoreError::InvalidRequest(_) => {
                warn!(status = status.as_u16(), "Client error: {}", self);
            }
            StoreError::Unavailable(_) => {
                error!(status = status.as_u16(), "Server error: {}", self);
            }
        }

        let body = Envelope::error(code, self.to_string());
        (status, Json(body)).into_response()
    }
}

/// Extract the platform's session token, if present.
fn weboffice_token(headers: &HeaderMap) -> Option<&str> {
    headers.get(WEBOFFICE_TOKEN).and_then(|v| v.to_str().ok())
}

// =============================================================================
// File Handlers
// =============================================================================

/// `GET /v3/3rd/files/{file_id}` - file metadata.
pub async fn file_info_handler<S: CallbackStore>(
    State(state): State<AppState<S>>,
    Path(file_id): Path<String>,
) -> Result<Json<Envelope<FileInfo>>, StoreError> {
    let info = state.store.file_info(&file_id).await?;
    Ok(Json(Envelope::success(info)))
}

/// `GET /v3/3rd/files/{file_id}/download` - download URL.
pub async fn download_handler<S: CallbackStore>(
    State(state): State<AppState<S>>,
    Path(file_id): Path<String>,
    headers: HeaderMap,
) -> Result<Json<Envelope<DownloadInfo>>, StoreError> {
    let info = state
        .store
        .download_info(&file_id, weboffice_token(&headers))
        .await?;
    Ok(Json(Envelope::success(info)))
}

/// `GET /v3/3rd/files/{file_id}/permission?user_id=` - permission flags.
pub async fn permission_handler<S: CallbackStore>(
    State(state): State<AppState<S>>,
    Path(file_id): Path<String>,
    Query(query): Query<PermissionQueryParams>,
) -> Result<Json<Envelope<Permission>>, StoreError> {
    let permission = state
        .store
        .permission(&file_id, query.user_id.as_deref())
        .await?;
    Ok(Json(Envelope::success(permission)))
}

/// `GET /v3/3rd/files/{file_id}/history` - version history.
pub async fn history_handler<S: CallbackStore>(
    State(state): State<AppState<S>>,
    Path(file_id): Path<String>,
) -> Result<Json<Envelope<HistoryResponse>>, StoreError> {
    let history = state.store.history(&file_id).await?;
    Ok(Json(Envelope::success(HistoryResponse { history })))
}

/// `GET /v3/3rd/files/{file_id}/versions/{version}` - one version's metadata.
pub async fn version_info_handler<S: CallbackStore>(
    State(state): State<AppState<S>>,
    Path(params): Path<VersionPathParams>,
) -> Result<Json<Envelope<VersionInfo>>, StoreError> {
    let info = state
        .store
        .version_info(&params.file_id, params.version)
        .await?;
    Ok(Json(Envelope::success(info)))
}

// =============================================================================
// Save Handlers
// =============================================================================

/// `POST /v3/3rd/files/{file_id}/save` - phase 1 of a three-phase save.
///
/// The body is optional; callers may announce the upcoming content's size
/// and MD5.
pub async fn begin_save_handler<S: CallbackStore>(
    State(state): State<AppState<S>>,
    Path(file_id): Path<String>,
    body: Option<Json<SaveRequest>>,
) -> Result<Json<Envelope<SaveSlot>>, StoreError> {
    let request = body.map(|Json(r)| r).unwrap_or_default();
    let slot = state.store.begin_save(&file_id, &request).await?;
    Ok(Json(Envelope::success(slot)))
}

/// `POST /v3/3rd/files/{file_id}/save/notify` - phase 3, content uploaded.
pub async fn save_notify_handler<S: CallbackStore>(
    State(state): State<AppState<S>>,
    Path(file_id): Path<String>,
    Json(notify): Json<SaveNotifyRequest>,
) -> Result<Json<Envelope<SaveReceipt>>, StoreError> {
    let receipt = state.store.finish_save(&file_id, &notify).await?;
    Ok(Json(Envelope::success(receipt)))
}

/// `PUT /v3/3rd/files/{file_id}/content` - single-phase save of a raw body.
pub async fn save_content_handler<S: CallbackStore>(
    State(state): State<AppState<S>>,
    Path(file_id): Path<String>,
    content: Bytes,
) -> Result<Json<Envelope<SaveReceipt>>, StoreError> {
    let receipt = state.store.save_content(&file_id, content).await?;
    Ok(Json(Envelope::success(receipt)))
}

/// `GET /v3/3rd/files/{file_id}/edit` - online-edit info.
pub async fn edit_info_handler<S: CallbackStore>(
    State(state): State<AppState<S>>,
    Path(file_id): Path<String>,
    headers: HeaderMap,
) -> Result<Json<Envelope<EditInfo>>, StoreError> {
    let info = state
        .store
        .edit_info(&file_id, weboffice_token(&headers))
        .await?;
    Ok(Json(Envelope::success(info)))
}

// =============================================================================
// User Handlers
// =============================================================================

/// `GET /v3/3rd/users/{user_id}` - user metadata.
pub async fn user_info_handler<S: CallbackStore>(
    State(state): State<AppState<S>>,
    Path(user_id): Path<String>,
) -> Result<Json<Envelope<UserInfo>>, StoreError> {
    let info = state.store.user_info(&user_id).await?;
    Ok(Json(Envelope::success(info)))
}

/// `POST /v3/3rd/users/batch` - batch user metadata.
///
/// An empty or missing `user_ids` list is a client error (code 40000).
pub async fn users_batch_handler<S: CallbackStore>(
    State(state): State<AppState<S>>,
    Json(request): Json<UsersBatchRequest>,
) -> Result<Json<Envelope<UsersResponse>>, StoreError> {
    if request.user_ids.is_empty() {
        return Err(StoreError::InvalidRequest(
            "Invalid user_ids parameter".to_string(),
        ));
    }

    let users = state.store.users_batch(&request.user_ids).await?;
    Ok(Json(Envelope::success(UsersResponse { users })))
}

// =============================================================================
// Public Handlers
// =============================================================================

/// `GET /health` - health check, never behind signature verification.
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        service: "weboffice-callback".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

/// Fallback for unmatched routes.
pub async fn not_found_handler() -> Response {
    (
        StatusCode::NOT_FOUND,
        Json(Envelope::error(CODE_NOT_FOUND, "Not found")),
    )
        .into_response()
}

// =============================================================================
// Tests
// =============================================================================
