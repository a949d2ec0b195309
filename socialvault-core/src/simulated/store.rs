use std::cell::RefCell;
use std::collections::HashMap;

use async_trait::async_trait;
use rand::distributions::Alphanumeric;
use rand::Rng;
use tracing::debug;

use super::delay::SimulatedDelay;
use crate::constants::{GATEWAY_BASE_URL, SIMULATED_CID_BODY_LEN, SIMULATED_CID_PREFIX};
use crate::error::VaultError;
use crate::traits::storage::{ContentReference, ContentStore};

/// Content store that fabricates identifiers instead of hashing content.
///
/// Payloads are kept in memory so a retrieve within the same process
/// round-trips; nothing is persisted.
pub struct SimulatedContentStore {
    upload_delay: SimulatedDelay,
    retrieve_delay: SimulatedDelay,
    blobs: RefCell<HashMap<String, Vec<u8>>>,
}

impl SimulatedContentStore {
    pub fn new(upload_delay: SimulatedDelay, retrieve_delay: SimulatedDelay) -> Self {
        Self {
            upload_delay,
            retrieve_delay,
            blobs: RefCell::new(HashMap::new()),
        }
    }

    /// Delays matching the hosted-gateway behavior the dashboard shipped with.
    pub fn with_reference_delays() -> Self {
        Self::new(
            SimulatedDelay::reference_upload(),
            SimulatedDelay::reference_retrieve(),
        )
    }

    pub fn instant() -> Self {
        Self::new(SimulatedDelay::None, SimulatedDelay::None)
    }

    pub fn gateway_url(id: &str) -> String {
        format!("{GATEWAY_BASE_URL}{id}")
    }

    fn mock_content_id() -> String {
        let body: String = rand::thread_rng()
            .sample_iter(&Alphanumeric)
            .take(SIMULATED_CID_BODY_LEN)
            .map(char::from)
            .collect();
        format!("{SIMULATED_CID_PREFIX}{body}")
    }
}

#[async_trait(?Send)]
impl ContentStore for SimulatedContentStore {
    async fn upload(&self, payload: &[u8]) -> Result<ContentReference, VaultError> {
        self.upload_delay.wait(payload.len()).await;

        let id = Self::mock_content_id();
        self.blobs.borrow_mut().insert(id.clone(), payload.to_vec());

        debug!("Simulated upload {} ({} bytes)", id, payload.len());
        Ok(ContentReference {
            id,
            size: payload.len() as u64,
        })
    }

    async fn retrieve(&self, id: &str) -> Result<Vec<u8>, VaultError> {
        self.retrieve_delay.wait(0).await;

        self.blobs
            .borrow()
            .get(id)
            .cloned()
            .ok_or_else(|| VaultError::Storage(format!("unknown content id: {id}")))
    }

    async fn remove(&self, id: &str) -> Result<(), VaultError> {
        self.blobs.borrow_mut().remove(id);
        debug!("Simulated unpin {}", id);
        Ok(())
    }
}
