use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use socialvault_core::backup::config::{BackupConfig, DateRange};
use socialvault_core::backup::workflow::{BackupOutcome, BackupWorkflow};
use socialvault_core::crypto::password::Passphrase;
use socialvault_core::history::{format_bytes, total_size, HistoryEntry};
use socialvault_core::platform::Platform;
use socialvault_core::simulated::{SimulatedContentStore, SyntheticSource};
use socialvault_core::traits::clock::Clock;

use super::{read_passphrase, Services};
use crate::progress::StepProgress;

/// What the user asked `backup` to do, before settings are applied.
#[derive(Debug, Clone, Default)]
pub struct BackupRequest {
    pub platform: String,
    /// `Some` when `--encrypt` / `--no-encrypt` was given.
    pub encrypt: Option<bool>,
    pub include_images: bool,
    pub include_videos: bool,
    pub from: Option<u64>,
    pub to: Option<u64>,
    /// Seal with a generated passphrase instead of asking for one.
    pub generate_key: bool,
    /// Passphrase to seal with; prompted for when needed and absent.
    pub passphrase: Option<Passphrase>,
}

/// Back up one platform: fetch, process, encrypt, store, record.
///
/// Ctrl-C cancels the run between steps. On success the backup is appended to
/// the local history and, when a passphrase was generated, it is printed once.
pub async fn run_backup(
    services: &Services,
    request: BackupRequest,
    cancel: &CancellationToken,
) -> Result<(), Box<dyn std::error::Error>> {
    let config = build_config(&request, services.settings.default_encryption)?;

    let history = services.history.list().await?;
    check_storage_limit(total_size(&history), services.settings.storage_limit_bytes())?;

    if !services.platforms.is_connected(&config.platform).await? {
        warn!(
            "{} is not connected; run `socialvault connect {}` to mark it as linked",
            config.platform, config.platform
        );
    }

    // Prompt before the progress bar starts drawing over the terminal line.
    let passphrase = match request.passphrase {
        Some(p) => Some(p),
        None if config.encrypt && !request.generate_key => Some(read_passphrase(true)?),
        None => None,
    };

    let source = SyntheticSource::new(&services.clock, services.fetch_delay());
    let progress = StepProgress::new()?;

    let mut workflow = BackupWorkflow::new(
        &source,
        services.store.as_ref(),
        services.ledger.as_ref(),
        &services.rng,
        &services.clock,
    )
    .with_observer(&progress);

    if let Some(passphrase) = passphrase.filter(|_| config.encrypt) {
        workflow = workflow.with_passphrase(passphrase);
    }
    if let Some(timeout) = services.settings.step_timeout {
        workflow = workflow.with_step_timeout(timeout);
    }

    info!("Starting {} backup", config.platform);
    let outcome = match workflow.run(&config, cancel).await {
        Ok(outcome) => {
            progress.finish();
            outcome
        }
        Err(e) => {
            progress.abandon();
            return Err(e.into());
        }
    };

    let entry = history_entry(&config, &outcome, services.clock.now_millis()?);
    if let Err(e) = services.history.append(&entry).await {
        // The backup itself is stored and recorded; only the local index is missing.
        warn!("Failed to add {} to local history: {e}", entry.content_id);
    }

    let gateway = services
        .settings
        .simulate
        .then(|| SimulatedContentStore::gateway_url(&outcome.content.id));
    print_outcome(&outcome, gateway.as_deref());
    Ok(())
}

pub fn build_config(
    request: &BackupRequest,
    default_encryption: bool,
) -> Result<BackupConfig, Box<dyn std::error::Error>> {
    let platform: Platform = request.platform.parse()?;

    let config = BackupConfig {
        platform: platform.id().to_string(),
        include_images: request.include_images,
        include_videos: request.include_videos,
        date_range: DateRange {
            from: request.from,
            to: request.to,
        },
        encrypt: request.encrypt.unwrap_or(default_encryption),
    };
    config.validate()?;

    if request.generate_key && !config.encrypt {
        return Err("--generate-key has no effect on an unencrypted backup".into());
    }
    Ok(config)
}

/// Refuse a new backup once the recorded history already exceeds the limit.
pub fn check_storage_limit(used: u64, limit: u64) -> Result<(), Box<dyn std::error::Error>> {
    if used > limit {
        return Err(format!(
            "storage limit reached: {} used of {}",
            format_bytes(used),
            format_bytes(limit)
        )
        .into());
    }
    Ok(())
}

fn history_entry(config: &BackupConfig, outcome: &BackupOutcome, now: u64) -> HistoryEntry {
    let display_name = config
        .platform
        .parse::<Platform>()
        .map(|p| p.display_name())
        .unwrap_or(config.platform.as_str());

    HistoryEntry {
        id: format!("{}_{}", config.platform, now),
        content_id: outcome.content.id.clone(),
        tx_id: outcome.tx_id.clone(),
        timestamp: now,
        platform: config.platform.clone(),
        encrypted: outcome.encrypted,
        size: outcome.content.size,
        description: Some(format!("{display_name} backup, {} posts", outcome.post_count)),
    }
}

fn print_outcome(outcome: &BackupOutcome, gateway: Option<&str>) {
    println!();
    println!("Backup complete");
    println!("  Content ID:  {}", outcome.content.id);
    println!("  Size:        {}", format_bytes(outcome.content.size));
    println!("  Posts:       {}", outcome.post_count);
    println!("  Encrypted:   {}", if outcome.encrypted { "yes" } else { "no" });
    println!("  Transaction: {}", outcome.tx_id);
    if let Some(url) = gateway {
        println!("  Gateway:     {url}");
    }

    if let Some(passphrase) = &outcome.generated_passphrase {
        println!();
        println!("Generated passphrase (shown once, store it somewhere safe):");
        println!("  {}", passphrase.expose());
        println!("Without it this backup cannot be restored.");
    }
}
