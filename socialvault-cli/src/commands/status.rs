use std::time::Duration;

use tracing::info;

use socialvault_core::history::{format_bytes, total_size, HistoryEntry};
use socialvault_core::traits::clock::Clock;

use super::Services;
use crate::config::Frequency;
use crate::display::format_timestamp;
use crate::storage::LocalFsStore;

/// Show wallet, ledger and storage state plus the backup schedule.
pub async fn run_status(services: &Services) -> Result<(), Box<dyn std::error::Error>> {
    let settings = &services.settings;

    println!("SocialVault Status");
    println!("==================");
    println!(
        "  Mode:    {}",
        if settings.simulate { "simulated" } else { "local" }
    );
    println!("  Home:    {}", settings.home.display());

    println!();
    match settings.wallet.as_deref() {
        Some(wallet) => {
            println!("Wallet: {wallet}");
            services.ledger.initialize().await?;
            let registered = services.ledger.is_registered(wallet).await?;
            let entries = services.ledger.entry_count(wallet).await?;
            println!("  Registered:     {}", if registered { "yes" } else { "no" });
            println!("  Ledger entries: {entries}");
        }
        None => println!("Wallet: not connected (set SOCIALVAULT_WALLET)"),
    }

    let history = services.history.list().await?;
    let used = total_size(&history);
    let limit = settings.storage_limit_bytes();
    println!();
    println!("Storage:");
    println!("  Backups: {}", history.len());
    println!("  Used:    {} of {}", format_bytes(used), format_bytes(limit));
    if !settings.simulate {
        let blobs = LocalFsStore::new(&settings.blobs_dir()).list_ids().await?;
        println!("  Blobs:   {}", blobs.len());
    }

    println!();
    println!("Settings:");
    println!(
        "  Default encryption: {}",
        if settings.default_encryption { "on" } else { "off" }
    );
    if !settings.notification_email.is_empty() {
        println!("  Notifications:      {}", settings.notification_email);
    }
    if let Some(timeout) = settings.step_timeout {
        println!("  Step timeout:       {}s", timeout.as_secs());
    }

    if settings.auto_backup {
        let now = services.clock.now_millis()?;
        let due = next_backup_due(&history, settings.frequency, now);
        println!("  Auto backup:        {}", settings.frequency.as_str());
        println!("  Next backup due:    {}", format_timestamp(due));
    } else {
        println!("  Auto backup:        off");
    }

    info!("Status displayed");
    Ok(())
}

/// When the next scheduled backup is due: one interval after the latest
/// backup, or `now` if there has never been one.
pub fn next_backup_due(history: &[HistoryEntry], frequency: Frequency, now: u64) -> u64 {
    let interval = duration_millis(frequency.interval());
    history
        .iter()
        .map(|e| e.timestamp)
        .max()
        .map_or(now, |last| last.saturating_add(interval))
}

fn duration_millis(d: Duration) -> u64 {
    u64::try_from(d.as_millis()).unwrap_or(u64::MAX)
}
