use tracing::info;

use socialvault_core::history::{filter_by_platform, format_bytes, sort_newest_first, HistoryEntry};

use super::Services;
use crate::display::{format_timestamp, short_id};

/// List past backups, newest first, optionally for a single platform.
pub async fn run_history(
    services: &Services,
    platform: Option<&str>,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut entries = services.history.list().await?;
    sort_newest_first(&mut entries);
    let shown = filter_by_platform(&entries, platform);

    if shown.is_empty() {
        println!("No backups found.");
        return Ok(());
    }

    println!(
        "{:<20}  {:<10}  {:>10}  {:<9}  {:<19}  {}",
        "Date", "Platform", "Size", "Encrypted", "Content ID", "Description"
    );
    for entry in &shown {
        println!("{}", render_row(entry));
    }

    let size: u64 = shown.iter().map(|e| e.size).sum();
    println!();
    println!("{} backups, {} total", shown.len(), format_bytes(size));

    info!("Listed {} history entries", shown.len());
    Ok(())
}

fn render_row(entry: &HistoryEntry) -> String {
    format!(
        "{:<20}  {:<10}  {:>10}  {:<9}  {:<19}  {}",
        format_timestamp(entry.timestamp),
        entry.platform,
        format_bytes(entry.size),
        if entry.encrypted { "yes" } else { "no" },
        short_id(&entry.content_id),
        entry.description.as_deref().unwrap_or("")
    )
}
