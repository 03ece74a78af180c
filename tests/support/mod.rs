#![allow(dead_code)]

use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use vaultcal::components::google_calendar::{CalendarEvent, CalendarSource, WatchChannel};
use vaultcal::error::{api_error, SyncResult};

/// In-memory calendar that records how it was called
#[derive(Debug, Default)]
pub struct MockCalendar {
    events: Vec<CalendarEvent>,
    fail: bool,
    list_calls: AtomicUsize,
    watch_addresses: Mutex<Vec<String>>,
}

impl MockCalendar {
    pub fn with_events(events: Vec<CalendarEvent>) -> Self {
        Self {
            events,
            ..Default::default()
        }
    }

    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Default::default()
        }
    }

    pub fn list_calls(&self) -> usize {
        self.list_calls.load(Ordering::SeqCst)
    }

    pub fn watch_addresses(&self) -> Vec<String> {
        self.watch_addresses.lock().unwrap().clone()
    }
}

#[async_trait]
impl CalendarSource for MockCalendar {
    async fn list_upcoming_events(&self, max_results: u32) -> SyncResult<Vec<CalendarEvent>> {
        self.list_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail {
            return Err(api_error("mock calendar unavailable"));
        }
        Ok(self.events.iter().take(max_results as usize).cloned().collect())
    }

    async fn register_watch(&self, callback_url: &str, _ttl_seconds: u64) -> SyncResult<WatchChannel> {
        self.watch_addresses.lock().unwrap().push(callback_url.to_string());
        if self.fail {
            return Err(api_error("mock calendar unavailable"));
        }
        Ok(WatchChannel {
            kind: "api#channel".to_string(),
            id: uuid::Uuid::new_v4().to_string(),
            ..Default::default()
        })
    }
}

/// Events used across the integration tests
pub fn sample_events() -> Vec<CalendarEvent> {
    vec![
        CalendarEvent {
            id: "event1".to_string(),
            summary: Some("Standup".to_string()),
            start_date_time: Some("2024-01-10T09:00:00Z".to_string()),
            html_link: Some("https://x/1".to_string()),
            ..Default::default()
        },
        CalendarEvent {
            id: "event2".to_string(),
            summary: Some("Company offsite".to_string()),
            start_date: Some("2024-01-12".to_string()),
            html_link: Some("https://x/2".to_string()),
            ..Default::default()
        },
    ]
}

/// Markdown files currently in `dir`
pub fn notes_in(dir: &std::path::Path) -> Vec<std::path::PathBuf> {
    match std::fs::read_dir(dir) {
        Ok(entries) => entries
            .filter_map(|e| e.ok().map(|e| e.path()))
            .filter(|p| p.extension().is_some_and(|ext| ext == "md"))
            .collect(),
        Err(_) => Vec::new(),
    }
}
