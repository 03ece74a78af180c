//! Daily markdown note written into the vault directory.

mod markdown;

pub use markdown::render_markdown;

use crate::components::google_calendar::CalendarEvent;
use crate::error::{filesystem_error, SyncResult};
use chrono::{Local, NaiveDate};
use std::path::{Path, PathBuf};
use tracing::info;

/// `YYYY-MM-DD.md`
pub fn note_file_name(date: NaiveDate) -> String {
    format!("{}.md", date.format("%Y-%m-%d"))
}

/// Write today's note; see [`write_daily_note_for`]
pub async fn write_daily_note(
    vault_dir: &Path,
    events: &[CalendarEvent],
) -> SyncResult<Option<PathBuf>> {
    write_daily_note_for(vault_dir, events, Local::now().date_naive()).await
}

/// Overwrite the note for `date` with the rendered events.
///
/// Nothing is written when `events` is empty. Returns the path written.
pub async fn write_daily_note_for(
    vault_dir: &Path,
    events: &[CalendarEvent],
    date: NaiveDate,
) -> SyncResult<Option<PathBuf>> {
    if events.is_empty() {
        info!("No upcoming events.");
        return Ok(None);
    }

    tokio::fs::create_dir_all(vault_dir).await.map_err(|e| {
        filesystem_error(&format!(
            "Failed to create vault directory {}: {}",
            vault_dir.display(),
            e
        ))
    })?;

    let path = vault_dir.join(note_file_name(date));
    let markdown = render_markdown(events, date);

    tokio::fs::write(&path, markdown).await.map_err(|e| {
        filesystem_error(&format!("Failed to write note {}: {}", path.display(), e))
    })?;
    info!("Google Calendar events synced to {}", path.display());

    Ok(Some(path))
}
