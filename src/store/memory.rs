//! In-memory reference store.
//!
//! Serves the same mock shapes the platform documentation shows, with just
//! enough real state (a version counter and pending upload slots) to make the
//! save flows observable in tests. Everything here is placeholder data; a
//! production deployment implements [`CallbackStore`] against its own
//! systems.

use std::collections::HashMap;
use std::time::{SystemTime, UNIX_EPOCH};

use async_trait::async_trait;
use bytes::Bytes;
use rand::RngCore;
use tokio::sync::RwLock;
use tracing::debug;

use crate::error::StoreError;

use super::{
    CallbackStore, DownloadInfo, EditInfo, FileInfo, FileVersion, Permission, SaveNotifyRequest,
    SaveReceipt, SaveRequest, SaveSlot, UserInfo, VersionInfo,
};

/// How long an allocated upload slot stays valid.
const UPLOAD_SLOT_TTL_SECS: u64 = 3600;

/// Placeholder size reported for files we have no real content for.
const MOCK_FILE_SIZE: u64 = 1024 * 1024;

/// In-memory [`CallbackStore`] with mock data.
pub struct MemoryStore {
    /// Prefix for generated download URLs
    download_prefix: String,

    /// Prefix for generated upload URLs
    upload_prefix: String,

    /// Current version per file id; files start at version 1
    versions: RwLock<HashMap<String, u32>>,

    /// Outstanding upload slots: upload_id -> file_id
    pending_uploads: RwLock<HashMap<String, String>>,
}

impl MemoryStore {
    /// Create a store generating URLs under the given prefixes.
    pub fn new(download_prefix: impl Into<String>, upload_prefix: impl Into<String>) -> Self {
        Self {
            download_prefix: trim_trailing_slash(download_prefix.into()),
            upload_prefix: trim_trailing_slash(upload_prefix.into()),
            versions: RwLock::new(HashMap::new()),
            pending_uploads: RwLock::new(HashMap::new()),
        }
    }

    fn download_url(&self, file_id: &str) -> String {
        format!("{}/{}/download", self.download_prefix, file_id)
    }

    async fn current_version(&self, file_id: &str) -> u32 {
        self.versions.read().await.get(file_id).copied().unwrap_or(1)
    }

    async fn bump_version(&self, file_id: &str) -> u32 {
        let mut versions = self.versions.write().await;
        let version = versions.entry(file_id.to_string()).or_insert(1);
        *version += 1;
        *version
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new("https://example.com/files", "https://example.com/uploads")
    }
}

#[async_trait]
impl CallbackStore for MemoryStore {
    async fn file_info(&self, file_id: &str) -> Result<FileInfo, StoreError> {
        let now = unix_now();
        Ok(FileInfo {
            id: file_id.to_string(),
            name: format!("file_{}.docx", file_id),
            version: self.current_version(file_id).await,
            size: MOCK_FILE_SIZE,
            creator_id: "user_001".to_string(),
            create_time: now.saturating_sub(86400),
            modifier_id: "user_001".to_string(),
            modify_time: now,
            download_url: self.download_url(file_id),
            preview_url: Some(format!("{}/{}/preview", self.download_prefix, file_id)),
            thumbnail_url: Some(format!("{}/{}/thumbnail", self.download_prefix, file_id)),
        })
    }

    async fn download_info(
        &self,
        file_id: &str,
        token: Option<&str>,
    ) -> Result<DownloadInfo, StoreError> {
        // A real store would mint a short-lived URL bound to the token.
        let expires = unix_now() + UPLOAD_SLOT_TTL_SECS;
        let url = match token {
            Some(token) => format!(
                "{}?token={}&expires={}",
                self.download_url(file_id),
                token,
                expires
            ),
            None => self.download_url(file_id),
        };
        Ok(DownloadInfo { download_url: url })
    }

    async fn permission(
        &self,
        _file_id: &str,
        _user_id: Option<&str>,
    ) -> Result<Permission, StoreError> {
        Ok(Permission::full())
    }

    async fn history(&self, file_id: &str) -> Result<Vec<FileVersion>, StoreError> {
        let current = self.current_version(file_id).await;
        let now = unix_now();

        // One entry per version, newest first.
        Ok((1..=current)
            .rev()
            .map(|version| FileVersion {
                version,
                creator_id: "user_001".to_string(),
                create_time: now.saturating_sub(86400 * u64::from(current - version + 1)),
                size: MOCK_FILE_SIZE,
            })
            .collect())
    }

    async fn version_info(&self, file_id: &str, version: u32) -> Result<VersionInfo, StoreError> {
        let current = self.current_version(file_id).await;
        if version == 0 || version > current {
            return Err(StoreError::NotFound(format!(
                "file {} has no version {}",
                file_id, version
            )));
        }

        Ok(VersionInfo {
            id: file_id.to_string(),
            version,
            download_url: format!(
                "{}/{}/versions/{}/download",
                self.download_prefix, file_id, version
            ),
            creator_id: "user_001".to_string(),
            create_time: unix_now().saturating_sub(86400),
            size: MOCK_FILE_SIZE,
        })
    }

    async fn begin_save(
        &self,
        file_id: &str,
        _request: &SaveRequest,
    ) -> Result<SaveSlot, StoreError> {
        let upload_id = random_upload_id();
        self.pending_uploads
            .write()
            .await
            .insert(upload_id.clone(), file_id.to_string());

        debug!(file_id, upload_id, "allocated upload slot");

        Ok(SaveSlot {
            upload_url: format!("{}/{}", self.upload_prefix, upload_id),
            upload_id,
            expire_time: unix_now() + UPLOAD_SLOT_TTL_SECS,
        })
    }

    async fn finish_save(
        &self,
        file_id: &str,
        notify: &SaveNotifyRequest,
    ) -> Result<SaveReceipt, StoreError> {
        let claimed = self.pending_uploads.write().await.remove(&notify.upload_id);
        match claimed {
            Some(owner) if owner == file_id => {}
            _ => {
                return Err(StoreError::InvalidRequest(format!(
                    "unknown upload_id: {}",
                    notify.upload_id
                )))
            }
        }

        let version = self.bump_version(file_id).await;
        debug!(file_id, version, "save committed");

        Ok(SaveReceipt {
            file_id: file_id.to_string(),
            version,
            download_url: notify
                .download_url
                .clone()
                .or_else(|| Some(self.download_url(file_id))),
            modify_time: unix_now(),
        })
    }

    async fn save_content(&self, file_id: &str, content: Bytes) -> Result<SaveReceipt, StoreError> {
        if content.is_empty() {
            return Err(StoreError::InvalidRequest("empty request body".to_string()));
        }

        let version = self.bump_version(file_id).await;
        debug!(file_id, version, size = content.len(), "content saved");

        Ok(SaveReceipt {
            file_id: file_id.to_string(),
            version,
            download_url: None,
            modify_time: unix_now(),
        })
    }

    async fn edit_info(
        &self,
        file_id: &str,
        _token: Option<&str>,
    ) -> Result<EditInfo, StoreError> {
        // A real store resolves the user from the token.
        Ok(EditInfo {
            file_id: file_id.to_string(),
            download_url: self.download_url(file_id),
            user_id: "user_001".to_string(),
            user_name: "Test User".to_string(),
            user_avatar: "https://example.com/avatars/user_001.jpg".to_string(),
            permission: Permission::full_for_user(),
        })
    }

    async fn user_info(&self, user_id: &str) -> Result<UserInfo, StoreError> {
        Ok(UserInfo {
            id: user_id.to_string(),
            name: format!("User {}", user_id),
            avatar_url: format!("https://example.com/avatars/{}.jpg", user_id),
            permission: Some(Permission::full_for_user()),
        })
    }

    async fn users_batch(&self, user_ids: &[String]) -> Result<Vec<UserInfo>, StoreError> {
        Ok(user_ids
            .iter()
            .map(|user_id| UserInfo {
                id: user_id.clone(),
                name: format!("User {}", user_id),
                avatar_url: format!("https://example.com/avatars/{}.jpg", user_id),
                permission: None,
            })
            .collect())
    }
}

/// Current time as Unix seconds.
fn unix_now() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}

/// 16 random bytes, hex-encoded, as the opaque upload id.
fn random_upload_id() -> String {
    let mut bytes = [0u8; 16];
    rand::thread_rng().fill_bytes(&mut bytes);
    hex::encode(bytes)
}

fn trim_trailing_slash(mut s: String) -> String {
    while s.ends_with('/') {
        s.pop();
    }
    s
}

// =============================================================================
// Tests
// =============================================================================
