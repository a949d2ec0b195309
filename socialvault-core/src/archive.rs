//! Platform snapshots and the processed archive that gets uploaded.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::backup::config::BackupConfig;
use crate::crypto::envelope::EncryptedPayload;
use crate::error::{Result, VaultError};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Post {
    pub id: String,
    pub content: String,
    /// Unix milliseconds.
    pub timestamp: u64,
    pub likes: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Profile {
    pub username: String,
    pub followers: u32,
    pub following: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MediaKind {
    Image,
    Video,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MediaItem {
    pub id: String,
    pub kind: MediaKind,
    pub url: String,
    pub post_id: String,
}

/// Raw data as returned by a platform source.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlatformSnapshot {
    pub platform: String,
    pub posts: Vec<Post>,
    pub profile: Profile,
    pub media: Vec<MediaItem>,
}

/// Snapshot after filtering and ordering, ready to be sealed and uploaded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BackupArchive {
    pub platform: String,
    /// Unix milliseconds.
    pub created_at: u64,
    pub posts: Vec<Post>,
    pub profile: Profile,
    pub media: Vec<MediaItem>,
}

/// Document written to the content store.
///
/// A sealed backup carries only the encrypted payload; the key is handed back
/// to the caller and never stored next to it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum StoredBackup {
    Plain { archive: BackupArchive },
    Sealed { platform: String, payload: EncryptedPayload },
}

impl StoredBackup {
    pub fn is_encrypted(&self) -> bool {
        matches!(self, StoredBackup::Sealed { .. })
    }

    pub fn to_json(&self) -> Result<Vec<u8>> {
        serde_json::to_vec(self).map_err(|e| VaultError::Serialization(e.to_string()))
    }

    pub fn from_json(bytes: &[u8]) -> Result<Self> {
        serde_json::from_slice(bytes).map_err(|e| VaultError::Serialization(e.to_string()))
    }
}

impl BackupArchive {
    pub fn to_json(&self) -> Result<Vec<u8>> {
        serde_json::to_vec(self).map_err(|e| VaultError::Serialization(e.to_string()))
    }

    pub fn from_json(bytes: &[u8]) -> Result<Self> {
        serde_json::from_slice(bytes).map_err(|e| VaultError::Serialization(e.to_string()))
    }
}

/// Turn a raw snapshot into an archive according to `config`.
///
/// Posts outside the date range are dropped, duplicate post ids keep their
/// first occurrence, and posts end up newest first. Media survive only when
/// their kind is included and their post was kept.
pub fn process_snapshot(
    snapshot: PlatformSnapshot,
    config: &BackupConfig,
    created_at: u64,
) -> Result<BackupArchive> {
    if snapshot.platform != config.platform {
        return Err(VaultError::InvalidData(format!(
            "snapshot is for '{}', backup requested '{}'",
            snapshot.platform, config.platform
        )));
    }

    let mut seen = HashSet::new();
    let mut posts: Vec<Post> = snapshot
        .posts
        .into_iter()
        .filter(|p| config.date_range.contains(p.timestamp))
        .filter(|p| seen.insert(p.id.clone()))
        .collect();
    posts.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));

    let kept: HashSet<&str> = posts.iter().map(|p| p.id.as_str()).collect();
    let media = snapshot
        .media
        .into_iter()
        .filter(|m| match m.kind {
            MediaKind::Image => config.include_images,
            MediaKind::Video => config.include_videos,
        })
        .filter(|m| kept.contains(m.post_id.as_str()))
        .collect();

    Ok(BackupArchive {
        platform: snapshot.platform,
        created_at,
        posts,
        profile: snapshot.profile,
        media,
    })
}
