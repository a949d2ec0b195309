use std::env;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

/// How often an automatic backup should run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Frequency {
    Daily,
    Weekly,
    Monthly,
}

impl Frequency {
    pub fn interval(self) -> Duration {
        let days = match self {
            Frequency::Daily => 1,
            Frequency::Weekly => 7,
            Frequency::Monthly => 30,
        };
        Duration::from_secs(days * 86_400)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Frequency::Daily => "daily",
            Frequency::Weekly => "weekly",
            Frequency::Monthly => "monthly",
        }
    }
}

impl FromStr for Frequency {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "daily" => Ok(Frequency::Daily),
            "weekly" => Ok(Frequency::Weekly),
            "monthly" => Ok(Frequency::Monthly),
            other => Err(format!("unknown backup frequency: {other}")),
        }
    }
}

/// Client settings loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Settings {
    /// Directory holding blobs and the SQLite database.
    pub home: PathBuf,
    /// Wallet address used as the ledger signing identity.
    pub wallet: Option<String>,
    pub auto_backup: bool,
    pub frequency: Frequency,
    pub default_encryption: bool,
    pub notification_email: String,
    pub storage_limit_mb: u64,
    pub step_timeout: Option<Duration>,
    /// Use the simulated content store and ledger instead of the local ones.
    pub simulate: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            home: PathBuf::from(".socialvault"),
            wallet: None,
            auto_backup: false,
            frequency: Frequency::Weekly,
            default_encryption: true,
            notification_email: String::new(),
            storage_limit_mb: 1024,
            step_timeout: None,
            simulate: false,
        }
    }
}

impl Settings {
    /// Load settings from environment variables.
    ///
    /// - `SOCIALVAULT_HOME` (default `.socialvault`)
    /// - `SOCIALVAULT_WALLET` (optional)
    /// - `SOCIALVAULT_AUTO_BACKUP` (default false)
    /// - `SOCIALVAULT_FREQUENCY` daily|weekly|monthly (default weekly)
    /// - `SOCIALVAULT_DEFAULT_ENCRYPTION` (default true)
    /// - `SOCIALVAULT_NOTIFY_EMAIL` (default empty)
    /// - `SOCIALVAULT_STORAGE_LIMIT_MB` (default 1024)
    /// - `SOCIALVAULT_STEP_TIMEOUT_SECS` (optional)
    /// - `SOCIALVAULT_SIMULATE` (default false)
    ///
    /// Unparseable values fall back to the default.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();

        let home = lookup("SOCIALVAULT_HOME")
            .filter(|s| !s.trim().is_empty())
            .map(PathBuf::from)
            .unwrap_or(defaults.home);

        let wallet = lookup("SOCIALVAULT_WALLET")
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty());

        let step_timeout = lookup("SOCIALVAULT_STEP_TIMEOUT_SECS")
            .and_then(|s| s.trim().parse::<u64>().ok())
            .filter(|&secs| secs > 0)
            .map(Duration::from_secs);

        Self {
            home,
            wallet,
            auto_backup: parse_bool(lookup("SOCIALVAULT_AUTO_BACKUP"), defaults.auto_backup),
            frequency: lookup("SOCIALVAULT_FREQUENCY")
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.frequency),
            default_encryption: parse_bool(
                lookup("SOCIALVAULT_DEFAULT_ENCRYPTION"),
                defaults.default_encryption,
            ),
            notification_email: lookup("SOCIALVAULT_NOTIFY_EMAIL")
                .map(|s| s.trim().to_string())
                .unwrap_or(defaults.notification_email),
            storage_limit_mb: lookup("SOCIALVAULT_STORAGE_LIMIT_MB")
                .and_then(|s| s.trim().parse::<u64>().ok())
                .unwrap_or(defaults.storage_limit_mb),
            step_timeout,
            simulate: parse_bool(lookup("SOCIALVAULT_SIMULATE"), defaults.simulate),
        }
    }

    pub fn storage_limit_bytes(&self) -> u64 {
        self.storage_limit_mb.saturating_mul(1024 * 1024)
    }

    pub fn blobs_dir(&self) -> PathBuf {
        self.home.join("blobs")
    }

    pub fn db_path(&self) -> PathBuf {
        self.home.join("vault.db")
    }
}

fn parse_bool(value: Option<String>, default: bool) -> bool {
    match value.as_deref().map(|s| s.trim().to_ascii_lowercase()) {
        Some(v) if matches!(v.as_str(), "1" | "true" | "yes" | "on") => true,
        Some(v) if matches!(v.as_str(), "0" | "false" | "no" | "off") => false,
        _ => default,
    }
}
