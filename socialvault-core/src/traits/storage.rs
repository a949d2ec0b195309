use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::VaultError;

/// Handle returned by a content store for an uploaded payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContentReference {
    pub id: String,
    pub size: u64,
}

/// Content-addressed store for backup payloads.
///
/// `upload` resolves only after the payload is durably accepted; the returned
/// id is opaque to callers.
#[async_trait(?Send)]
pub trait ContentStore {
    async fn upload(&self, payload: &[u8]) -> Result<ContentReference, VaultError>;
    async fn retrieve(&self, id: &str) -> Result<Vec<u8>, VaultError>;
    async fn remove(&self, id: &str) -> Result<(), VaultError>;
}
