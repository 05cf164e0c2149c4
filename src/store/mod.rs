//! File and user store abstraction.
//!
//! The callback handlers are thin adapters: every piece of real data comes
//! from a [`CallbackStore`] implementation. Production deployments implement
//! the trait against their own file storage and user directory;
//! [`MemoryStore`] provides the reference mock data for development and
//! tests.

mod memory;

pub use memory::MemoryStore;

use async_trait::async_trait;
use bytes::Bytes;
use serde::{Deserialize, Serialize};

use crate::error::StoreError;

// =============================================================================
// Data Types
// =============================================================================

/// File metadata returned for the file-info callback.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileInfo {
    /// File identifier
    pub id: String,

    /// Display name, including extension
    pub name: String,

    /// Current version number (monotonically increasing)
    pub version: u32,

    /// File size in bytes
    pub size: u64,

    /// Creating user id
    pub creator_id: String,

    /// Creation time (Unix seconds)
    pub create_time: u64,

    /// Last modifying user id
    pub modifier_id: String,

    /// Last modification time (Unix seconds)
    pub modify_time: u64,

    /// Where the platform fetches the file content
    pub download_url: String,

    /// Optional preview location
    #[serde(skip_serializing_if = "Option::is_none")]
    pub preview_url: Option<String>,

    /// Optional thumbnail location
    #[serde(skip_serializing_if = "Option::is_none")]
    pub thumbnail_url: Option<String>,
}

/// Download coordination info.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DownloadInfo {
    /// Possibly short-lived URL the platform downloads the content from
    pub download_url: String,
}

/// Per-user permission flags on a file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Permission {
    pub read: bool,
    pub write: bool,
    pub comment: bool,
    pub copy: bool,
    pub print: bool,
    pub export: bool,

    /// Whether version history is visible; not reported in user contexts
    #[serde(skip_serializing_if = "Option::is_none")]
    pub history: Option<bool>,
}

impl Permission {
    /// Full access, as the reference data grants.
    pub fn full() -> Self {
        Self {
            read: true,
            write: true,
            comment: true,
            copy: true,
            print: true,
            export: true,
            history: Some(true),
        }
    }

    /// Full access without the history flag, for user-scoped responses.
    pub fn full_for_user() -> Self {
        Self {
            history: None,
            ..Self::full()
        }
    }
}

/// One entry in a file's version history.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileVersion {
    pub version: u32,
    pub creator_id: String,
    pub create_time: u64,
    pub size: u64,
}

/// Metadata for one specific version of a file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VersionInfo {
    pub id: String,
    pub version: u32,
    pub download_url: String,
    pub creator_id: String,
    pub create_time: u64,
    pub size: u64,
}

/// Body of the phase-1 save callback.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SaveRequest {
    /// Declared size of the content about to be uploaded
    pub size: Option<u64>,

    /// Declared MD5 of the content
    pub md5: Option<String>,
}

/// Upload slot handed back in phase 1 of a three-phase save.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SaveSlot {
    /// Where the platform uploads the new content
    pub upload_url: String,

    /// Opaque id correlating the later notify call with this slot
    pub upload_id: String,

    /// Unix seconds after which the slot is invalid
    pub expire_time: u64,
}

/// Body of the phase-3 save-complete notification.
#[derive(Debug, Clone, Deserialize)]
pub struct SaveNotifyRequest {
    pub upload_id: String,
    pub download_url: Option<String>,
    pub md5: Option<String>,
    pub size: Option<u64>,
}

/// Result of a completed save, single-phase or three-phase.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SaveReceipt {
    pub file_id: String,

    /// New version number after the save
    pub version: u32,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub download_url: Option<String>,

    pub modify_time: u64,
}

/// Everything the platform needs to open a file for online editing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EditInfo {
    pub file_id: String,
    pub download_url: String,
    pub user_id: String,
    pub user_name: String,
    pub user_avatar: String,
    pub permission: Permission,
}

/// User metadata returned for the user callbacks.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserInfo {
    pub id: String,
    pub name: String,
    pub avatar_url: String,

    /// Included on single-user lookups, omitted in batch responses
    #[serde(skip_serializing_if = "Option::is_none")]
    pub permission: Option<Permission>,
}

// =============================================================================
// Store Trait
// =============================================================================

/// Backing store the callback handlers delegate to.
///
/// Persistence, file storage, versioning and user-directory integration live
/// behind this seam; the HTTP layer never touches them directly. The `token`
/// parameters carry the `x-weboffice-token` header value when the platform
/// sent one.
#[async_trait]
pub trait CallbackStore: Send + Sync {
    /// Metadata for a file.
    async fn file_info(&self, file_id: &str) -> Result<FileInfo, StoreError>;

    /// Download URL for a file's current content.
    async fn download_info(
        &self,
        file_id: &str,
        token: Option<&str>,
    ) -> Result<DownloadInfo, StoreError>;

    /// Permission flags for a user on a file.
    async fn permission(
        &self,
        file_id: &str,
        user_id: Option<&str>,
    ) -> Result<Permission, StoreError>;

    /// Version history of a file, newest first.
    async fn history(&self, file_id: &str) -> Result<Vec<FileVersion>, StoreError>;

    /// Metadata for one specific version.
    async fn version_info(&self, file_id: &str, version: u32) -> Result<VersionInfo, StoreError>;

    /// Phase 1 of a three-phase save: allocate an upload slot.
    async fn begin_save(
        &self,
        file_id: &str,
        request: &SaveRequest,
    ) -> Result<SaveSlot, StoreError>;

    /// Phase 3 of a three-phase save: the content was uploaded, commit it.
    async fn finish_save(
        &self,
        file_id: &str,
        notify: &SaveNotifyRequest,
    ) -> Result<SaveReceipt, StoreError>;

    /// Single-phase save of a raw request body.
    async fn save_content(&self, file_id: &str, content: Bytes) -> Result<SaveReceipt, StoreError>;

    /// Everything needed to open a file for editing.
    async fn edit_info(&self, file_id: &str, token: Option<&str>)
        -> Result<EditInfo, StoreError>;

    /// Metadata for a single user.
    async fn user_info(&self, user_id: &str) -> Result<UserInfo, StoreError>;

    /// Metadata for a batch of users.
    async fn users_batch(&self, user_ids: &[String]) -> Result<Vec<UserInfo>, StoreError>;
}
