use async_trait::async_trait;

use crate::archive::PlatformSnapshot;
use crate::backup::config::BackupConfig;
use crate::error::VaultError;

/// Provider of a user's platform data (posts, profile, media).
#[async_trait(?Send)]
pub trait PlatformSource {
    async fn fetch(&self, config: &BackupConfig) -> Result<PlatformSnapshot, VaultError>;
}
