//! CLI command implementations (backup, restore, history, register, status,
//! platforms, connect/disconnect).

pub mod backup;
pub mod restore;
pub mod history;
pub mod register;
pub mod status;
pub mod platforms;

use tracing::debug;

use socialvault_core::crypto::password::Passphrase;
use socialvault_core::simulated::{SimulatedContentStore, SimulatedDelay, SimulatedLedger};
use socialvault_core::traits::ledger::Ledger;
use socialvault_core::traits::storage::ContentStore;

use crate::config::Settings;
use crate::ledger::JournalLedger;
use crate::platform::{NativeClock, NativeRandom};
use crate::storage::{LocalFsStore, SqliteHistory, SqlitePlatforms};

/// Adapters wired up for one CLI invocation.
///
/// The content store and ledger are the local ones unless `SOCIALVAULT_SIMULATE`
/// is set, in which case both are in-memory simulations with realistic delays.
pub struct Services {
    pub settings: Settings,
    pub store: Box<dyn ContentStore>,
    pub ledger: Box<dyn Ledger>,
    pub history: SqliteHistory,
    pub platforms: SqlitePlatforms,
    pub rng: NativeRandom,
    pub clock: NativeClock,
}

impl Services {
    pub fn open(settings: Settings) -> Result<Self, Box<dyn std::error::Error>> {
        let db_path = settings.db_path();
        let history = SqliteHistory::open(&db_path)?;
        let platforms = SqlitePlatforms::open(&db_path)?;

        let (store, ledger): (Box<dyn ContentStore>, Box<dyn Ledger>) = if settings.simulate {
            debug!("Using simulated content store and ledger");
            (
                Box::new(SimulatedContentStore::with_reference_delays()),
                Box::new(SimulatedLedger::new(
                    settings.wallet.clone(),
                    SimulatedDelay::reference_retrieve(),
                    SimulatedDelay::reference_upload(),
                )),
            )
        } else {
            debug!("Using local store at {}", settings.blobs_dir().display());
            (
                Box::new(LocalFsStore::new(&settings.blobs_dir())),
                Box::new(JournalLedger::open(&db_path, settings.wallet.clone())?),
            )
        };

        Ok(Self {
            settings,
            store,
            ledger,
            history,
            platforms,
            rng: NativeRandom::new(),
            clock: NativeClock::new(),
        })
    }

    /// Delay applied to the synthetic platform fetch.
    pub fn fetch_delay(&self) -> SimulatedDelay {
        if self.settings.simulate {
            SimulatedDelay::reference_retrieve()
        } else {
            SimulatedDelay::None
        }
    }
}

/// Read the backup passphrase from `SOCIALVAULT_PASSPHRASE` or prompt for it.
///
/// When `confirm` is set the prompt asks twice and both entries must match.
pub fn read_passphrase(confirm: bool) -> Result<Passphrase, Box<dyn std::error::Error>> {
    if let Ok(p) = std::env::var("SOCIALVAULT_PASSPHRASE") {
        if p.is_empty() {
            return Err("SOCIALVAULT_PASSPHRASE is set but empty".into());
        }
        return Ok(Passphrase::new(p));
    }

    let entered = Passphrase::new(rpassword::prompt_password("Enter backup passphrase: ")?);
    if entered.is_empty() {
        return Err("Passphrase cannot be empty".into());
    }
    if confirm {
        let again = Passphrase::new(rpassword::prompt_password("Confirm backup passphrase: ")?);
        if entered.expose() != again.expose() {
            return Err("Passphrases do not match".into());
        }
    }
    Ok(entered)
}
