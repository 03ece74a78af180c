use crate::components::daily_note::write_daily_note;
use crate::components::google_calendar::WatchChannel;
use crate::context::AppContext;
use crate::error::SyncResult;
use std::path::PathBuf;
use tracing::info;

/// One fetch-and-write cycle: authorize, list, render, write.
///
/// Returns the note path, or `None` when there were no events to write.
pub async fn sync_daily_note(ctx: &AppContext) -> SyncResult<Option<PathBuf>> {
    let events = ctx
        .calendar
        .list_upcoming_events(ctx.config.max_results)
        .await?;
    info!("Fetched {} upcoming events", events.len());

    write_daily_note(&ctx.config.vault_dir, &events).await
}

/// Register a push subscription for the configured callback URL.
///
/// Each call creates a new channel; earlier channels are not stopped.
pub async fn register_watch(ctx: &AppContext) -> SyncResult<WatchChannel> {
    ctx.calendar
        .register_watch(&ctx.config.callback_url, ctx.config.watch_ttl_seconds)
        .await
}
