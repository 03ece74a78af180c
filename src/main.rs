use tracing::info;
use vaultcal::startup;

#[tokio::main]
async fn main() -> miette::Result<()> {
    // Initialize logging
    startup::init_logging()?;

    info!("Starting vaultcal");

    // Load configuration
    let config = startup::load_config()?;

    // Sync, register the watch, then serve webhooks
    startup::start(config).await
}
