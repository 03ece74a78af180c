use crate::components::webhook;
use crate::config::Config;
use crate::context::AppContext;
use crate::error::Error;
use crate::shutdown;
use crate::sync::{register_watch, sync_daily_note};
use std::future::Future;
use tracing::{error, info, warn};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

/// Initialize logging with environment-based configuration
pub fn init_logging() -> miette::Result<()> {
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,tower_http=debug")),
        )
        .finish();

    tracing::subscriber::set_global_default(subscriber)
        .map_err(|e| Error::Other(format!("Failed to set up logging: {}", e)))?;

    Ok(())
}

/// Load the application config
pub fn load_config() -> miette::Result<Config> {
    match Config::load() {
        Ok(config) => Ok(config),
        Err(e) => {
            error!("Failed to load configuration: {:?}", e);
            Err(e.into())
        }
    }
}

/// Startup steps that run before the listener; failures are logged only
pub async fn bootstrap(ctx: &AppContext) {
    // Run once on startup
    match sync_daily_note(ctx).await {
        Ok(Some(path)) => info!("Initial sync wrote {}", path.display()),
        Ok(None) => info!("Initial sync found nothing to write"),
        Err(e) => error!("Initial sync failed: {:?}", e),
    }

    if ctx.config.has_placeholder_callback() {
        warn!(
            "CALLBACK_URL is still the placeholder {}, push notifications will not arrive",
            ctx.config.callback_url
        );
    }

    // Register webhook automatically
    match register_watch(ctx).await {
        Ok(channel) => info!("Google Calendar watch registered: {:?}", channel),
        Err(e) => error!("Failed to register calendar watch: {:?}", e),
    }
}

/// Bootstrap, then serve the webhook listener until `shutdown` resolves
pub async fn run_with_shutdown<F>(ctx: AppContext, shutdown: F) -> miette::Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    bootstrap(&ctx).await;

    webhook::serve(ctx, shutdown).await?;
    info!("Webhook server stopped");

    Ok(())
}

/// Start the service against the Google Calendar API
pub async fn start(config: Config) -> miette::Result<()> {
    let ctx = AppContext::with_google_calendar(config);
    run_with_shutdown(ctx, shutdown::shutdown_signal()).await
}
