//! Terminal formatting helpers shared by the commands.

use chrono::{DateTime, Utc};

/// Format Unix milliseconds as `YYYY-MM-DD HH:MM UTC`.
pub fn format_timestamp(millis: u64) -> String {
    i64::try_from(millis)
        .ok()
        .and_then(DateTime::<Utc>::from_timestamp_millis)
        .map(|dt| dt.format("%Y-%m-%d %H:%M UTC").to_string())
        .unwrap_or_else(|| format!("{millis} ms"))
}

/// Shorten a long identifier to `head…tail` for table output.
pub fn short_id(id: &str) -> String {
    const KEEP: usize = 8;
    if id.len() <= KEEP * 2 + 1 || !id.is_ascii() {
        return id.to_string();
    }
    format!("{}…{}", &id[..KEEP], &id[id.len() - KEEP..])
}
