use serde::{Deserialize, Serialize};

use crate::error::{Result, VaultError};

/// Optional inclusive bounds on post timestamps (Unix milliseconds).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    pub from: Option<u64>,
    pub to: Option<u64>,
}

impl DateRange {
    pub fn contains(&self, timestamp: u64) -> bool {
        self.from.map_or(true, |from| timestamp >= from)
            && self.to.map_or(true, |to| timestamp <= to)
    }
}

/// What to back up and how. Fixed for the duration of a run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BackupConfig {
    pub platform: String,
    pub include_images: bool,
    pub include_videos: bool,
    pub date_range: DateRange,
    pub encrypt: bool,
}

impl BackupConfig {
    /// Defaults match the backup form: images on, videos off, encrypted.
    pub fn new(platform: impl Into<String>) -> Self {
        Self {
            platform: platform.into(),
            include_images: true,
            include_videos: false,
            date_range: DateRange::default(),
            encrypt: true,
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.platform.trim().is_empty() {
            return Err(VaultError::InvalidData("platform must not be empty".to_string()));
        }
        if let (Some(from), Some(to)) = (self.date_range.from, self.date_range.to) {
            if from > to {
                return Err(VaultError::InvalidData(format!(
                    "date range is inverted: from {from} > to {to}"
                )));
            }
        }
        Ok(())
    }
}
