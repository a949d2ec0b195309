use tracing::info;

use super::Services;

/// Register the configured wallet on the ledger.
pub async fn run_register(services: &Services) -> Result<(), Box<dyn std::error::Error>> {
    let wallet = services
        .settings
        .wallet
        .as_deref()
        .ok_or("No wallet configured. Set SOCIALVAULT_WALLET to your wallet address.")?;

    services.ledger.initialize().await?;

    if services.ledger.is_registered(wallet).await? {
        println!("{wallet} is already registered.");
        return Ok(());
    }

    info!("Registering {wallet}...");
    let tx_id = services.ledger.register().await?;

    println!("Registered {wallet}");
    println!("  Transaction: {tx_id}");
    Ok(())
}
