use tracing::info;

use socialvault_core::history::last_backup;
use socialvault_core::platform::Platform;
use socialvault_core::traits::clock::Clock;

use super::Services;
use crate::display::format_timestamp;

/// List every supported platform with its link state and last backup.
pub async fn run_platforms(services: &Services) -> Result<(), Box<dyn std::error::Error>> {
    let links = services.platforms.connections().await?;
    let history = services.history.list().await?;

    println!(
        "{:<10}  {:<12}  {:<10}  {}",
        "Platform", "Name", "Status", "Last backup"
    );
    for platform in Platform::ALL {
        let connected = links.get(platform.id()).copied().unwrap_or(false);
        let last = last_backup(&history, platform.id())
            .map(format_timestamp)
            .unwrap_or_else(|| "never".to_string());
        println!(
            "{:<10}  {:<12}  {:<10}  {}",
            platform.id(),
            platform.display_name(),
            if connected { "connected" } else { "-" },
            last
        );
    }
    Ok(())
}

/// Mark a platform as linked (`connected = true`) or unlinked.
pub async fn run_connect(
    services: &Services,
    platform: &str,
    connected: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let platform: Platform = platform.parse()?;
    let now = services.clock.now_millis()?;
    services
        .platforms
        .set_connected(platform.id(), connected, now)
        .await?;

    let verb = if connected { "Connected" } else { "Disconnected" };
    info!("{verb} {}", platform.id());
    println!("{verb} {}", platform.display_name());
    Ok(())
}
