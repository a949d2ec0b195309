use std::future::Future;
use std::time::Duration;

use tokio_util::sync::CancellationToken;
use tracing::{info, warn};
use zeroize::Zeroizing;

use super::config::BackupConfig;
use super::observer::{NoopObserver, StepObserver};
use super::step::{StepId, StepList};
use crate::archive::{process_snapshot, StoredBackup};
use crate::constants::DEFAULT_PASSPHRASE_LEN;
use crate::crypto::envelope;
use crate::crypto::password::{generate_random_password, Passphrase};
use crate::error::{Result, VaultError};
use crate::traits::clock::Clock;
use crate::traits::ledger::{Ledger, TxId};
use crate::traits::random::SecureRandom;
use crate::traits::source::PlatformSource;
use crate::traits::storage::{ContentReference, ContentStore};

/// Result of a backup that went through all five steps.
#[derive(Debug)]
pub struct BackupOutcome {
    pub content: ContentReference,
    pub tx_id: TxId,
    pub encrypted: bool,
    pub post_count: usize,
    /// Set when the archive was sealed with a freshly generated passphrase.
    /// This is the only copy; it is not uploaded anywhere.
    pub generated_passphrase: Option<Passphrase>,
}

/// Runs fetch → process → encrypt → store → record against injected adapters.
///
/// The workflow owns its step list. A run stops at the first failing step,
/// leaves the failure visible through [`BackupWorkflow::steps`] and never
/// retries on its own; call [`BackupWorkflow::reset`] before running again.
pub struct BackupWorkflow<'a> {
    source: &'a dyn PlatformSource,
    store: &'a dyn ContentStore,
    ledger: &'a dyn Ledger,
    rng: &'a dyn SecureRandom,
    clock: &'a dyn Clock,
    observer: &'a dyn StepObserver,
    passphrase: Option<Passphrase>,
    step_timeout: Option<Duration>,
    steps: StepList,
}

impl<'a> BackupWorkflow<'a> {
    pub fn new(
        source: &'a dyn PlatformSource,
        store: &'a dyn ContentStore,
        ledger: &'a dyn Ledger,
        rng: &'a dyn SecureRandom,
        clock: &'a dyn Clock,
    ) -> Self {
        Self {
            source,
            store,
            ledger,
            rng,
            clock,
            observer: &NoopObserver,
            passphrase: None,
            step_timeout: None,
            steps: StepList::new(),
        }
    }

    /// Seal archives with a caller-held passphrase instead of a generated one.
    pub fn with_passphrase(mut self, passphrase: Passphrase) -> Self {
        self.passphrase = Some(passphrase);
        self
    }

    /// Fail any step whose action takes longer than `timeout`.
    pub fn with_step_timeout(mut self, timeout: Duration) -> Self {
        self.step_timeout = Some(timeout);
        self
    }

    pub fn with_observer(mut self, observer: &'a dyn StepObserver) -> Self {
        self.observer = observer;
        self
    }

    pub fn steps(&self) -> &StepList {
        &self.steps
    }

    pub fn reset(&mut self) {
        self.steps.reset();
    }

    pub async fn run(
        &mut self,
        config: &BackupConfig,
        cancel: &CancellationToken,
    ) -> Result<BackupOutcome> {
        if !self.steps.is_idle() {
            return Err(VaultError::InvalidState(
                "workflow has already run; reset it before retrying".to_string(),
            ));
        }
        config.validate()?;
        if cancel.is_cancelled() {
            info!("Backup of {} cancelled before start", config.platform);
            return Err(VaultError::Cancelled);
        }

        info!(
            "Starting backup of {} (encrypt: {})",
            config.platform, config.encrypt
        );

        // Fetch.
        let source = self.source;
        let snapshot = self
            .run_step(StepId::Fetch, "Connecting to platform API...", source.fetch(config))
            .await?;
        self.finish(StepId::Fetch, format!("Fetched {} posts", snapshot.posts.len()))?;
        self.checkpoint(cancel)?;

        // Process.
        let clock = self.clock;
        let archive = self
            .run_step(StepId::Process, "Organizing and cleaning data...", async move {
                let now = clock.now_millis()?;
                process_snapshot(snapshot, config, now)
            })
            .await?;
        let post_count = archive.posts.len();
        self.finish(
            StepId::Process,
            format!("Kept {} posts, {} media items", post_count, archive.media.len()),
        )?;
        self.checkpoint(cancel)?;

        // Encrypt.
        let (document, generated_passphrase) = if config.encrypt {
            let rng = self.rng;
            let supplied = self.passphrase.clone();
            let sealed = self
                .run_step(StepId::Encrypt, "Encrypting sensitive data...", async move {
                    let (passphrase, generated) = match supplied {
                        Some(p) => (p, false),
                        None => (generate_random_password(DEFAULT_PASSPHRASE_LEN, rng)?, true),
                    };
                    let plaintext = Zeroizing::new(archive.to_json()?);
                    let payload = envelope::encrypt(&plaintext, passphrase.expose(), rng)?;
                    let document = StoredBackup::Sealed {
                        platform: archive.platform,
                        payload,
                    };
                    Ok::<_, VaultError>((document, generated.then_some(passphrase)))
                })
                .await?;
            self.finish(StepId::Encrypt, "Data encrypted with AES-256-GCM")?;
            sealed
        } else {
            self.begin(StepId::Encrypt, "Encryption disabled")?;
            self.finish(StepId::Encrypt, "Encryption skipped")?;
            (StoredBackup::Plain { archive }, None)
        };
        self.checkpoint(cancel)?;

        // Store.
        let store = self.store;
        let content = self
            .run_step(StepId::Store, "Uploading to content store...", async move {
                let bytes = document.to_json()?;
                store.upload(&bytes).await
            })
            .await?;
        self.finish(StepId::Store, format!("Uploaded: {}", content.id))?;
        if let Err(e) = self.checkpoint(cancel) {
            self.discard_unrecorded(&content).await;
            return Err(e);
        }

        // Record.
        let ledger = self.ledger;
        let content_id = content.id.as_str();
        let platform = config.platform.as_str();
        let encrypted = config.encrypt;
        let tx_id = self
            .run_step(StepId::Record, "Recording on ledger...", async move {
                ledger.initialize().await?;
                ledger.record(content_id, platform, encrypted).await
            })
            .await?;
        self.finish(StepId::Record, format!("Transaction confirmed: {tx_id}"))?;

        info!(
            "Backup of {} complete: {} ({} bytes, tx {})",
            config.platform, content.id, content.size, tx_id
        );

        Ok(BackupOutcome {
            content,
            tx_id,
            encrypted,
            post_count,
            generated_passphrase,
        })
    }

    /// Start `id`, drive `action` (bounded by the step timeout, if any) and
    /// abort the run if it fails. The caller completes the step on success.
    async fn run_step<T>(
        &mut self,
        id: StepId,
        message: &str,
        action: impl Future<Output = Result<T>>,
    ) -> Result<T> {
        self.begin(id, message)?;

        let result = match self.step_timeout {
            Some(limit) => match tokio::time::timeout(limit, action).await {
                Ok(result) => result,
                Err(_) => Err(VaultError::Timeout { step: id, limit }),
            },
            None => action.await,
        };

        result.map_err(|e| {
            self.abort(id, &e);
            e
        })
    }

    fn begin(&mut self, id: StepId, message: &str) -> Result<()> {
        let step = self.steps.start(id, message)?;
        info!("[{}] {}", id, message);
        self.observer.on_transition(step);
        Ok(())
    }

    fn finish(&mut self, id: StepId, message: impl Into<String>) -> Result<()> {
        let step = self.steps.complete(id, message)?;
        info!("[{}] completed: {}", id, step.message.as_deref().unwrap_or_default());
        self.observer.on_transition(step);
        Ok(())
    }

    fn abort(&mut self, id: StepId, error: &VaultError) {
        warn!("[{}] failed: {}", id, error);
        if let Ok(step) = self.steps.fail(id, error.to_string()) {
            self.observer.on_transition(step);
        }
        for other in self.steps.interrupt() {
            self.observer.on_transition(self.steps.get(other));
        }
    }

    fn checkpoint(&self, cancel: &CancellationToken) -> Result<()> {
        if cancel.is_cancelled() {
            info!(
                "Backup cancelled after {} completed steps",
                self.steps.completed_prefix_len()
            );
            return Err(VaultError::Cancelled);
        }
        Ok(())
    }

    async fn discard_unrecorded(&self, content: &ContentReference) {
        match self.store.remove(&content.id).await {
            Ok(()) => info!("Removed unrecorded content {}", content.id),
            Err(e) => warn!("Failed to remove unrecorded content {}: {}", content.id, e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backup::step::StepStatus;
    use crate::crypto::envelope::decrypt;
    use crate::archive::BackupArchive;
    use crate::test_support::{
        FailingRng, FakeLedger, FakeSource, FakeStore, FixedClock, RecordingObserver, TestRng,
    };

    struct Harness {
        source: FakeSource,
        store: FakeStore,
        ledger: FakeLedger,
        rng: TestRng,
        clock: FixedClock,
        observer: RecordingObserver,
    }

    impl Harness {
        fn new() -> Self {
            Self {
                source: FakeSource::new(6),
                store: FakeStore::new(),
                ledger: FakeLedger::with_signer("0xabc"),
                rng: TestRng,
                clock: FixedClock(1_700_000_000_000),
                observer: RecordingObserver::default(),
            }
        }

        fn workflow(&self) -> BackupWorkflow<'_> {
            BackupWorkflow::new(&self.source, &self.store, &self.ledger, &self.rng, &self.clock)
                .with_observer(&self.observer)
        }
    }

    fn statuses(workflow: &BackupWorkflow<'_>) -> Vec<StepStatus> {
        workflow.steps().iter().map(|s| s.status).collect()
    }

    fn assert_completed_prefix(workflow: &BackupWorkflow<'_>) {
        let steps = workflow.steps().as_slice();
        let prefix = workflow.steps().completed_prefix_len();
        assert!(steps[prefix..]
            .iter()
            .all(|s| s.status != StepStatus::Completed));
    }

    #[tokio::test]
    async fn test_encrypted_backup_completes_all_steps() {
        let h = Harness::new();
        let mut workflow = h.workflow().with_passphrase(Passphrase::new("user passphrase"));
        let config = BackupConfig::new("twitter");

        let outcome = workflow.run(&config, &CancellationToken::new()).await.unwrap();

        assert!(workflow.steps().is_succeeded());
        assert_eq!(h.store.uploaded_ids(), vec![outcome.content.id.clone()]);
        assert_eq!(h.ledger.records(), vec![(outcome.content.id.clone(), "twitter".to_string(), true)]);
        assert!(outcome.encrypted);
        assert!(outcome.generated_passphrase.is_none());

        let stored = StoredBackup::from_json(&h.store.get(&outcome.content.id).unwrap()).unwrap();
        let StoredBackup::Sealed { payload, .. } = stored else {
            panic!("expected sealed backup");
        };
        let archive = BackupArchive::from_json(&decrypt(&payload, "user passphrase").unwrap()).unwrap();
        assert_eq!(archive.posts.len(), outcome.post_count);
        assert_eq!(archive.created_at, 1_700_000_000_000);
    }

    #[tokio::test]
    async fn test_generated_passphrase_is_returned_not_stored() {
        let h = Harness::new();
        let mut workflow = h.workflow();
        let outcome = workflow
            .run(&BackupConfig::new("twitter"), &CancellationToken::new())
            .await
            .unwrap();

        let passphrase = outcome.generated_passphrase.expect("generated passphrase");
        assert_eq!(passphrase.len(), DEFAULT_PASSPHRASE_LEN);

        let bytes = h.store.get(&outcome.content.id).unwrap();
        let text = String::from_utf8(bytes.clone()).unwrap();
        assert!(!text.contains(passphrase.expose()));

        let StoredBackup::Sealed { payload, .. } = StoredBackup::from_json(&bytes).unwrap() else {
            panic!("expected sealed backup");
        };
        assert!(decrypt(&payload, passphrase.expose()).is_ok());
    }

    #[tokio::test]
    async fn test_unencrypted_backup_skips_cipher() {
        let h = Harness::new();
        let mut workflow = h.workflow();
        let mut config = BackupConfig::new("twitter");
        config.encrypt = false;

        let outcome = workflow.run(&config, &CancellationToken::new()).await.unwrap();

        let encrypt = workflow.steps().get(StepId::Encrypt);
        assert_eq!(encrypt.status, StepStatus::Completed);
        assert_eq!(encrypt.message.as_deref(), Some("Encryption skipped"));
        assert!(outcome.generated_passphrase.is_none());
        assert!(!h.ledger.records()[0].2);

        let stored = StoredBackup::from_json(&h.store.get(&outcome.content.id).unwrap()).unwrap();
        assert!(!stored.is_encrypted());
        assert!(workflow.steps().is_succeeded());
    }

    #[tokio::test]
    async fn test_ledger_failure_fails_record_step() {
        let mut h = Harness::new();
        h.ledger.fail_records = true;
        let mut workflow = h.workflow();

        let result = workflow
            .run(&BackupConfig::new("twitter"), &CancellationToken::new())
            .await;

        assert!(matches!(result, Err(VaultError::Ledger(_))));
        let steps = workflow.steps();
        assert_eq!(steps.status(StepId::Store), StepStatus::Completed);
        assert_eq!(steps.status(StepId::Record), StepStatus::Failed);
        assert!(steps.get(StepId::Record).message.is_some());
        assert_eq!(h.store.uploaded_ids().len(), 1);
        assert_completed_prefix(&workflow);
    }

    #[tokio::test]
    async fn test_missing_signer_aborts_before_record() {
        let mut h = Harness::new();
        h.ledger = FakeLedger::without_signer();
        let mut workflow = h.workflow();

        let result = workflow
            .run(&BackupConfig::new("twitter"), &CancellationToken::new())
            .await;

        assert!(matches!(result, Err(VaultError::NotAvailable(_))));
        assert_eq!(workflow.steps().status(StepId::Record), StepStatus::Failed);
        assert_eq!(h.ledger.record_attempts(), 0);
    }

    #[tokio::test]
    async fn test_fetch_failure_leaves_later_steps_pending() {
        let mut h = Harness::new();
        h.source.fail = true;
        let mut workflow = h.workflow();

        let result = workflow
            .run(&BackupConfig::new("twitter"), &CancellationToken::new())
            .await;

        assert!(matches!(result, Err(VaultError::Fetch(_))));
        assert_eq!(
            statuses(&workflow),
            vec![
                StepStatus::Failed,
                StepStatus::Pending,
                StepStatus::Pending,
                StepStatus::Pending,
                StepStatus::Pending,
            ]
        );
        assert!(h.store.uploaded_ids().is_empty());
    }

    #[tokio::test]
    async fn test_failure_at_each_step_keeps_completed_prefix() {
        for failing in StepId::ALL {
            let mut source = FakeSource::new(4);
            let mut store = FakeStore::new();
            let mut ledger = FakeLedger::with_signer("0xabc");
            match failing {
                StepId::Fetch => source.fail = true,
                StepId::Process => source.platform_override = Some("instagram".to_string()),
                StepId::Encrypt => {}
                StepId::Store => store.fail_uploads = true,
                StepId::Record => ledger.fail_records = true,
            }
            let rng: &dyn SecureRandom = if failing == StepId::Encrypt {
                &FailingRng
            } else {
                &TestRng
            };
            let clock = FixedClock(1_700_000_000_000);

            let mut workflow = BackupWorkflow::new(&source, &store, &ledger, rng, &clock);
            let result = workflow
                .run(&BackupConfig::new("twitter"), &CancellationToken::new())
                .await;

            assert!(result.is_err(), "{failing} should fail the run");
            let index = StepId::ALL.iter().position(|&id| id == failing).unwrap();
            let steps = workflow.steps();
            assert_eq!(steps.completed_prefix_len(), index, "{failing}");
            assert_eq!(steps.status(failing), StepStatus::Failed, "{failing}");
            assert!(steps.as_slice()[index + 1..]
                .iter()
                .all(|s| s.status == StepStatus::Pending));
            assert_completed_prefix(&workflow);

            let expected_uploads = usize::from(failing == StepId::Record);
            assert_eq!(store.uploaded_ids().len(), expected_uploads, "{failing}");
            assert!(ledger.records().is_empty());
        }
    }

    #[tokio::test]
    async fn test_encrypt_failure_uploads_nothing() {
        let source = FakeSource::new(3);
        let store = FakeStore::new();
        let ledger = FakeLedger::with_signer("0xabc");
        let clock = FixedClock(1_700_000_000_000);
        let mut workflow = BackupWorkflow::new(&source, &store, &ledger, &FailingRng, &clock);

        let result = workflow
            .run(&BackupConfig::new("twitter"), &CancellationToken::new())
            .await;

        assert!(matches!(result, Err(VaultError::Encryption(_))));
        assert_eq!(
            statuses(&workflow),
            vec![
                StepStatus::Completed,
                StepStatus::Completed,
                StepStatus::Failed,
                StepStatus::Pending,
                StepStatus::Pending,
            ]
        );
        assert!(store.uploaded_ids().is_empty());
        assert_eq!(ledger.record_attempts(), 0);
    }

    #[tokio::test]
    async fn test_store_failure_stops_before_ledger() {
        let mut h = Harness::new();
        h.store.fail_uploads = true;
        let mut workflow = h.workflow();

        let result = workflow
            .run(&BackupConfig::new("twitter"), &CancellationToken::new())
            .await;

        assert!(matches!(result, Err(VaultError::Storage(_))));
        assert_eq!(workflow.steps().status(StepId::Store), StepStatus::Failed);
        assert_eq!(workflow.steps().status(StepId::Record), StepStatus::Pending);
        assert_eq!(h.ledger.record_attempts(), 0);
        assert_completed_prefix(&workflow);
    }

    #[tokio::test]
    async fn test_cancel_before_start() {
        let h = Harness::new();
        let mut workflow = h.workflow();
        let cancel = CancellationToken::new();
        cancel.cancel();

        let result = workflow.run(&BackupConfig::new("twitter"), &cancel).await;

        assert!(matches!(result, Err(VaultError::Cancelled)));
        assert!(workflow.steps().is_idle());
        assert_eq!(h.source.fetch_count(), 0);
    }

    #[tokio::test]
    async fn test_cancel_between_steps() {
        let mut h = Harness::new();
        let cancel = CancellationToken::new();
        h.source.cancel_on_fetch = Some(cancel.clone());
        let mut workflow = h.workflow();

        let result = workflow.run(&BackupConfig::new("twitter"), &cancel).await;

        assert!(matches!(result, Err(VaultError::Cancelled)));
        assert_eq!(workflow.steps().status(StepId::Fetch), StepStatus::Completed);
        assert_eq!(workflow.steps().status(StepId::Process), StepStatus::Pending);
        assert!(h.store.uploaded_ids().is_empty());
    }

    #[tokio::test]
    async fn test_cancel_after_upload_removes_content() {
        let mut h = Harness::new();
        let cancel = CancellationToken::new();
        h.store.cancel_on_upload = Some(cancel.clone());
        let mut workflow = h.workflow();

        let result = workflow.run(&BackupConfig::new("twitter"), &cancel).await;

        assert!(matches!(result, Err(VaultError::Cancelled)));
        assert_eq!(workflow.steps().status(StepId::Store), StepStatus::Completed);
        assert_eq!(workflow.steps().status(StepId::Record), StepStatus::Pending);
        assert_eq!(h.store.removed_ids().len(), 1);
        assert!(h.store.get(&h.store.removed_ids()[0]).is_none());
        assert_eq!(h.ledger.record_attempts(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_step_timeout_fails_step() {
        let mut h = Harness::new();
        h.source.delay = Some(Duration::from_secs(60));
        let mut workflow = h.workflow().with_step_timeout(Duration::from_secs(5));

        let result = workflow
            .run(&BackupConfig::new("twitter"), &CancellationToken::new())
            .await;

        assert!(matches!(
            result,
            Err(VaultError::Timeout { step: StepId::Fetch, limit }) if limit == Duration::from_secs(5)
        ));
        assert_eq!(workflow.steps().status(StepId::Fetch), StepStatus::Failed);
    }

    #[tokio::test(start_paused = true)]
    async fn test_sub_second_timeout_reported_exactly() {
        let mut h = Harness::new();
        h.source.delay = Some(Duration::from_secs(1));
        let mut workflow = h.workflow().with_step_timeout(Duration::from_millis(250));

        let err = workflow
            .run(&BackupConfig::new("twitter"), &CancellationToken::new())
            .await
            .unwrap_err();

        assert_eq!(err.to_string(), "Step fetch timed out after 250ms");
        assert_eq!(
            workflow.steps().get(StepId::Fetch).message.as_deref(),
            Some("Step fetch timed out after 250ms")
        );
    }

    #[tokio::test]
    async fn test_rerun_requires_reset() {
        let mut h = Harness::new();
        h.ledger.fail_records = true;
        let mut workflow = h.workflow();
        let config = BackupConfig::new("twitter");

        assert!(workflow.run(&config, &CancellationToken::new()).await.is_err());
        assert!(matches!(
            workflow.run(&config, &CancellationToken::new()).await,
            Err(VaultError::InvalidState(_))
        ));

        workflow.reset();
        assert!(workflow.steps().is_idle());
    }

    #[tokio::test]
    async fn test_invalid_config_touches_nothing() {
        let h = Harness::new();
        let mut workflow = h.workflow();
        let result = workflow
            .run(&BackupConfig::new(""), &CancellationToken::new())
            .await;
        assert!(matches!(result, Err(VaultError::InvalidData(_))));
        assert!(workflow.steps().is_idle());
        assert_eq!(h.source.fetch_count(), 0);
    }

    #[tokio::test]
    async fn test_observer_sees_ordered_transitions() {
        let h = Harness::new();
        let mut workflow = h.workflow();
        workflow
            .run(&BackupConfig::new("twitter"), &CancellationToken::new())
            .await
            .unwrap();

        let seen = h.observer.transitions();
        assert_eq!(seen.len(), 10);
        for (i, id) in StepId::ALL.iter().enumerate() {
            assert_eq!(seen[2 * i], (*id, StepStatus::InProgress));
            assert_eq!(seen[2 * i + 1], (*id, StepStatus::Completed));
        }
    }
}
