//! Backup history entries and the helpers the history and status views use.

use serde::{Deserialize, Serialize};

/// One successful backup as remembered by the client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub id: String,
    pub content_id: String,
    pub tx_id: String,
    /// Unix milliseconds.
    pub timestamp: u64,
    pub platform: String,
    pub encrypted: bool,
    pub size: u64,
    pub description: Option<String>,
}

/// Keep entries for `platform`; `None` or `"all"` keeps everything.
pub fn filter_by_platform<'a>(
    entries: &'a [HistoryEntry],
    platform: Option<&str>,
) -> Vec<&'a HistoryEntry> {
    match platform {
        None => entries.iter().collect(),
        Some(p) if p.eq_ignore_ascii_case("all") => entries.iter().collect(),
        Some(p) => entries
            .iter()
            .filter(|e| e.platform.eq_ignore_ascii_case(p))
            .collect(),
    }
}

pub fn sort_newest_first(entries: &mut [HistoryEntry]) {
    entries.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
}

/// Timestamp of the most recent backup of `platform`, if any.
pub fn last_backup(entries: &[HistoryEntry], platform: &str) -> Option<u64> {
    entries
        .iter()
        .filter(|e| e.platform.eq_ignore_ascii_case(platform))
        .map(|e| e.timestamp)
        .max()
}

pub fn total_size(entries: &[HistoryEntry]) -> u64 {
    entries.iter().map(|e| e.size).sum()
}

/// Human-readable size with 1024-based units, e.g. `2 MB` or `1.5 KB`.
pub fn format_bytes(bytes: u64) -> String {
    const UNITS: [&str; 4] = ["Bytes", "KB", "MB", "GB"];

    if bytes == 0 {
        return "0 Bytes".to_string();
    }

    let mut value = bytes as f64;
    let mut unit = 0;
    while value >= 1024.0 && unit < UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }

    let formatted = format!("{value:.2}");
    let trimmed = formatted.trim_end_matches('0').trim_end_matches('.');
    format!("{trimmed} {}", UNITS[unit])
}
