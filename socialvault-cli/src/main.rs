mod commands;
mod config;
mod display;
mod ledger;
mod platform;
mod progress;
mod storage;

use clap::{Parser, Subcommand};
use tokio_util::sync::CancellationToken;
use tracing::info;
use tracing_subscriber::EnvFilter;

use commands::backup::BackupRequest;
use commands::Services;
use config::Settings;

#[derive(Parser)]
#[command(name = "socialvault", about = "Encrypted, ledger-recorded social media backups")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Back up a platform: fetch, process, encrypt, store and record
    Backup {
        /// Platform id (see `socialvault platforms`)
        platform: String,

        /// Encrypt the archive even if SOCIALVAULT_DEFAULT_ENCRYPTION is off
        #[arg(long, conflicts_with = "no_encrypt")]
        encrypt: bool,

        /// Store the archive unencrypted
        #[arg(long)]
        no_encrypt: bool,

        /// Leave images out of the archive
        #[arg(long)]
        no_images: bool,

        /// Include videos in the archive
        #[arg(long)]
        include_videos: bool,

        /// Only keep posts at or after this time (Unix milliseconds)
        #[arg(long)]
        from: Option<u64>,

        /// Only keep posts at or before this time (Unix milliseconds)
        #[arg(long)]
        to: Option<u64>,

        /// Seal with a generated passphrase, printed once at the end
        #[arg(long)]
        generate_key: bool,
    },

    /// Restore a backup by content id and write the archive as JSON
    Restore {
        /// Content id printed by `backup` or listed by `history`
        content_id: String,

        /// Output file path
        output: String,
    },

    /// List past backups, newest first
    History {
        /// Only show backups of this platform ("all" for every platform)
        #[arg(long)]
        platform: Option<String>,
    },

    /// Register the configured wallet on the ledger
    Register,

    /// Show wallet, ledger, storage and schedule status
    Status,

    /// List supported platforms with link state and last backup
    Platforms,

    /// Mark a platform as connected
    Connect {
        /// Platform id (see `socialvault platforms`)
        platform: String,
    },

    /// Mark a platform as disconnected
    Disconnect {
        /// Platform id (see `socialvault platforms`)
        platform: String,
    },
}

#[tokio::main]
async fn main() {
    // Initialize tracing (controlled by RUST_LOG env var).
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    if let Err(e) = run(cli.command).await {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}

async fn run(command: Commands) -> Result<(), Box<dyn std::error::Error>> {
    let services = Services::open(Settings::from_env())?;

    match command {
        Commands::Backup {
            platform,
            encrypt,
            no_encrypt,
            no_images,
            include_videos,
            from,
            to,
            generate_key,
        } => {
            let request = BackupRequest {
                platform,
                encrypt: match (encrypt, no_encrypt) {
                    (true, _) => Some(true),
                    (_, true) => Some(false),
                    _ => None,
                },
                include_images: !no_images,
                include_videos,
                from,
                to,
                generate_key,
                passphrase: None,
            };

            let cancel = CancellationToken::new();
            let on_signal = cancel.clone();
            tokio::spawn(async move {
                if tokio::signal::ctrl_c().await.is_ok() {
                    info!("Interrupt received, stopping after the current step");
                    on_signal.cancel();
                }
            });

            commands::backup::run_backup(&services, request, &cancel).await
        }
        Commands::Restore { content_id, output } => {
            commands::restore::run_restore(&services, &content_id, &output, None).await
        }
        Commands::History { platform } => {
            commands::history::run_history(&services, platform.as_deref()).await
        }
        Commands::Register => commands::register::run_register(&services).await,
        Commands::Status => commands::status::run_status(&services).await,
        Commands::Platforms => commands::platforms::run_platforms(&services).await,
        Commands::Connect { platform } => {
            commands::platforms::run_connect(&services, &platform, true).await
        }
        Commands::Disconnect { platform } => {
            commands::platforms::run_connect(&services, &platform, false).await
        }
    }
}
