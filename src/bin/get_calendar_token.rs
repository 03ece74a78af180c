use vaultcal::components::google_calendar::oauth::authorize_interactively;
use vaultcal::components::google_calendar::token::save_token;
use vaultcal::components::google_calendar::load_credentials;
use vaultcal::config::Config;
use vaultcal::startup::init_logging;

/// Run the consent flow and overwrite the token cache, even if one exists
#[tokio::main]
async fn main() -> miette::Result<()> {
    // The consent URL is logged when no browser can be opened
    init_logging()?;

    // Load configuration
    let config = Config::load()?;

    let credentials = load_credentials(&config.credentials_path)?;
    let client = reqwest::Client::new();

    println!("Opening browser for Google Calendar authorization...");
    let token = authorize_interactively(&credentials, &client, &config.token_url).await?;

    save_token(&config.token_path, &token).await?;

    println!("Token successfully saved to {}!", config.token_path.display());

    Ok(())
}
