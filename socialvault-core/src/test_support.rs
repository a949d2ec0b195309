//! Deterministic adapters shared by the unit tests.

use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use sha2::{Digest, Sha256};
use tokio_util::sync::CancellationToken;

use crate::archive::{MediaItem, MediaKind, PlatformSnapshot, Post, Profile};
use crate::backup::config::BackupConfig;
use crate::backup::observer::StepObserver;
use crate::backup::step::{BackupStep, StepId, StepStatus};
use crate::error::VaultError;
use crate::traits::clock::Clock;
use crate::traits::ledger::{Ledger, TxId};
use crate::traits::random::SecureRandom;
use crate::traits::source::PlatformSource;
use crate::traits::storage::{ContentReference, ContentStore};

pub struct TestRng;

impl SecureRandom for TestRng {
    fn fill_bytes(&self, dest: &mut [u8]) -> Result<(), VaultError> {
        getrandom::getrandom(dest).map_err(|e| VaultError::Platform(e.to_string()))
    }
}

/// Replays a fixed byte sequence (cycling), or counts upward from zero.
pub struct SequenceRng {
    bytes: Vec<u8>,
    pos: Cell<usize>,
}

impl SequenceRng {
    pub fn new() -> Self {
        Self::from_bytes((0..=255u8).collect())
    }

    pub fn from_bytes(bytes: Vec<u8>) -> Self {
        Self {
            bytes,
            pos: Cell::new(0),
        }
    }
}

impl SecureRandom for SequenceRng {
    fn fill_bytes(&self, dest: &mut [u8]) -> Result<(), VaultError> {
        for byte in dest.iter_mut() {
            let pos = self.pos.get();
            *byte = self.bytes[pos % self.bytes.len()];
            self.pos.set(pos + 1);
        }
        Ok(())
    }
}

pub struct FailingRng;

impl SecureRandom for FailingRng {
    fn fill_bytes(&self, _dest: &mut [u8]) -> Result<(), VaultError> {
        Err(VaultError::Platform("entropy source unavailable".to_string()))
    }
}

pub struct FixedClock(pub u64);

impl Clock for FixedClock {
    fn now_millis(&self) -> Result<u64, VaultError> {
        Ok(self.0)
    }
}

pub struct FakeSource {
    posts: usize,
    pub fail: bool,
    /// Report snapshots as coming from this platform instead of the requested one.
    pub platform_override: Option<String>,
    pub delay: Option<Duration>,
    pub cancel_on_fetch: Option<CancellationToken>,
    fetches: Cell<usize>,
}

impl FakeSource {
    pub fn new(posts: usize) -> Self {
        Self {
            posts,
            fail: false,
            platform_override: None,
            delay: None,
            cancel_on_fetch: None,
            fetches: Cell::new(0),
        }
    }

    pub fn fetch_count(&self) -> usize {
        self.fetches.get()
    }
}

#[async_trait(?Send)]
impl PlatformSource for FakeSource {
    async fn fetch(&self, config: &BackupConfig) -> Result<PlatformSnapshot, VaultError> {
        self.fetches.set(self.fetches.get() + 1);
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        if let Some(token) = &self.cancel_on_fetch {
            token.cancel();
        }
        if self.fail {
            return Err(VaultError::Fetch("platform API unreachable".to_string()));
        }

        let posts = (0..self.posts)
            .map(|i| Post {
                id: format!("post_{i}"),
                content: format!("post number {i}"),
                timestamp: 1_000_000 + i as u64,
                likes: i as u32,
            })
            .collect();
        Ok(PlatformSnapshot {
            platform: self
                .platform_override
                .clone()
                .unwrap_or_else(|| config.platform.clone()),
            posts,
            profile: Profile {
                username: "tester".to_string(),
                followers: 10,
                following: 20,
            },
            media: vec![MediaItem {
                id: "media_0".to_string(),
                kind: MediaKind::Image,
                url: "https://cdn.example/media_0.jpg".to_string(),
                post_id: "post_0".to_string(),
            }],
        })
    }
}

/// In-memory store keyed by the hex SHA-256 of each payload.
pub struct FakeStore {
    blobs: RefCell<HashMap<String, Vec<u8>>>,
    uploaded: RefCell<Vec<String>>,
    removed: RefCell<Vec<String>>,
    pub fail_uploads: bool,
    pub cancel_on_upload: Option<CancellationToken>,
}

impl FakeStore {
    pub fn new() -> Self {
        Self {
            blobs: RefCell::new(HashMap::new()),
            uploaded: RefCell::new(Vec::new()),
            removed: RefCell::new(Vec::new()),
            fail_uploads: false,
            cancel_on_upload: None,
        }
    }

    pub fn get(&self, id: &str) -> Option<Vec<u8>> {
        self.blobs.borrow().get(id).cloned()
    }

    pub fn uploaded_ids(&self) -> Vec<String> {
        self.uploaded.borrow().clone()
    }

    pub fn removed_ids(&self) -> Vec<String> {
        self.removed.borrow().clone()
    }
}

#[async_trait(?Send)]
impl ContentStore for FakeStore {
    async fn upload(&self, payload: &[u8]) -> Result<ContentReference, VaultError> {
        if self.fail_uploads {
            return Err(VaultError::Storage("upload rejected".to_string()));
        }
        let id = hex::encode(Sha256::digest(payload));
        self.blobs.borrow_mut().insert(id.clone(), payload.to_vec());
        self.uploaded.borrow_mut().push(id.clone());
        if let Some(token) = &self.cancel_on_upload {
            token.cancel();
        }
        Ok(ContentReference {
            id,
            size: payload.len() as u64,
        })
    }

    async fn retrieve(&self, id: &str) -> Result<Vec<u8>, VaultError> {
        self.get(id)
            .ok_or_else(|| VaultError::NotFound(format!("content not found: {id}")))
    }

    async fn remove(&self, id: &str) -> Result<(), VaultError> {
        self.blobs.borrow_mut().remove(id);
        self.removed.borrow_mut().push(id.to_string());
        Ok(())
    }
}

pub struct FakeLedger {
    signer: Option<String>,
    initialized: Cell<bool>,
    pub fail_records: bool,
    attempts: Cell<usize>,
    records: RefCell<Vec<(String, String, bool)>>,
}

impl FakeLedger {
    pub fn with_signer(address: &str) -> Self {
        Self {
            signer: Some(address.to_string()),
            initialized: Cell::new(false),
            fail_records: false,
            attempts: Cell::new(0),
            records: RefCell::new(Vec::new()),
        }
    }

    pub fn without_signer() -> Self {
        Self {
            signer: None,
            ..Self::with_signer("")
        }
    }

    pub fn record_attempts(&self) -> usize {
        self.attempts.get()
    }

    pub fn records(&self) -> Vec<(String, String, bool)> {
        self.records.borrow().clone()
    }
}

#[async_trait(?Send)]
impl Ledger for FakeLedger {
    async fn initialize(&self) -> Result<(), VaultError> {
        if self.signer.is_none() {
            return Err(VaultError::NotAvailable("no signing identity".to_string()));
        }
        self.initialized.set(true);
        Ok(())
    }

    async fn register(&self) -> Result<TxId, VaultError> {
        Ok("0xregister".to_string())
    }

    async fn record(
        &self,
        content_id: &str,
        platform: &str,
        encrypted: bool,
    ) -> Result<TxId, VaultError> {
        self.attempts.set(self.attempts.get() + 1);
        if !self.initialized.get() {
            return Err(VaultError::Ledger("ledger not initialized".to_string()));
        }
        if self.fail_records {
            return Err(VaultError::Ledger("transaction reverted".to_string()));
        }
        let mut records = self.records.borrow_mut();
        records.push((content_id.to_string(), platform.to_string(), encrypted));
        Ok(format!("0xtx{}", records.len()))
    }

    async fn is_registered(&self, address: &str) -> Result<bool, VaultError> {
        Ok(self.signer.as_deref() == Some(address))
    }

    async fn entry_count(&self, _address: &str) -> Result<u64, VaultError> {
        Ok(self.records.borrow().len() as u64)
    }
}

#[derive(Default)]
pub struct RecordingObserver {
    seen: RefCell<Vec<(StepId, StepStatus)>>,
}

impl RecordingObserver {
    pub fn transitions(&self) -> Vec<(StepId, StepStatus)> {
        self.seen.borrow().clone()
    }
}

impl StepObserver for RecordingObserver {
    fn on_transition(&self, step: &BackupStep) {
        self.seen.borrow_mut().push((step.id, step.status));
    }
}
