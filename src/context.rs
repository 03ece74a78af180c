use crate::components::google_calendar::{CalendarSource, GoogleCalendarClient};
use crate::config::Config;
use std::fmt;
use std::sync::Arc;

/// Shared state built once at startup and handed to the listener and sync routines
#[derive(Clone)]
pub struct AppContext {
    pub config: Arc<Config>,
    pub calendar: Arc<dyn CalendarSource>,
}

impl fmt::Debug for AppContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AppContext")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl AppContext {
    /// Create a context around any calendar source
    pub fn new(config: Config, calendar: Arc<dyn CalendarSource>) -> Self {
        Self {
            config: Arc::new(config),
            calendar,
        }
    }

    /// Create a context backed by the Google Calendar API
    pub fn with_google_calendar(config: Config) -> Self {
        let config = Arc::new(config);
        let calendar = Arc::new(GoogleCalendarClient::new(Arc::clone(&config)));

        Self { config, calendar }
    }
}
