use std::path::Path;

use tracing::info;

use socialvault_core::archive::{BackupArchive, StoredBackup};
use socialvault_core::crypto::envelope;
use socialvault_core::crypto::password::Passphrase;

use super::{read_passphrase, Services};

/// Fetch a stored backup by content id and write its archive as JSON.
///
/// Sealed backups are decrypted with `passphrase`, or when that is `None`
/// with the one from `SOCIALVAULT_PASSPHRASE` or an interactive prompt.
pub async fn run_restore(
    services: &Services,
    content_id: &str,
    output: &str,
    passphrase: Option<Passphrase>,
) -> Result<(), Box<dyn std::error::Error>> {
    info!("Retrieving {content_id}...");
    let bytes = services.store.retrieve(content_id).await?;
    let stored = StoredBackup::from_json(&bytes)?;

    let passphrase = match passphrase {
        Some(p) => Some(p),
        None if stored.is_encrypted() => Some(read_passphrase(false)?),
        None => None,
    };
    let archive = open_backup(stored, passphrase.as_ref())?;

    let json = serde_json::to_vec_pretty(&archive)
        .map_err(|e| format!("failed to serialize archive: {e}"))?;
    tokio::fs::write(Path::new(output), &json)
        .await
        .map_err(|e| format!("failed to write {output}: {e}"))?;

    println!("Restored {} backup to {output}", archive.platform);
    println!("  Posts: {}", archive.posts.len());
    println!("  Media: {}", archive.media.len());
    println!("  Profile: @{}", archive.profile.username);
    Ok(())
}

/// Unwrap a stored document into its archive, decrypting when sealed.
pub fn open_backup(
    stored: StoredBackup,
    passphrase: Option<&Passphrase>,
) -> Result<BackupArchive, Box<dyn std::error::Error>> {
    match stored {
        StoredBackup::Plain { archive } => Ok(archive),
        StoredBackup::Sealed { platform, payload } => {
            let passphrase =
                passphrase.ok_or_else(|| format!("{platform} backup is encrypted; a passphrase is required"))?;
            let plaintext = envelope::decrypt(&payload, passphrase.expose())?;
            Ok(BackupArchive::from_json(&plaintext)?)
        }
    }
}
