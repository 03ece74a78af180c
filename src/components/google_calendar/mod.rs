mod client;
pub mod credentials;
pub mod models;
pub mod oauth;
pub mod token;

pub use client::GoogleCalendarClient;
pub use credentials::{load_credentials, Credentials};
pub use models::{CalendarEvent, WatchChannel};
pub use token::{StoredToken, TokenManager};

use crate::error::SyncResult;
use async_trait::async_trait;

/// Source of upcoming events and push subscriptions for one calendar
#[async_trait]
pub trait CalendarSource: Send + Sync {
    /// Upcoming single occurrences, ascending by start time, at most `max_results`.
    ///
    /// No events is an empty vector, not an error.
    async fn list_upcoming_events(&self, max_results: u32) -> SyncResult<Vec<CalendarEvent>>;

    /// Register a `web_hook` channel pointing at `callback_url`
    async fn register_watch(&self, callback_url: &str, ttl_seconds: u64) -> SyncResult<WatchChannel>;
}
