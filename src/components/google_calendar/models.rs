use serde::{Deserialize, Serialize};

/// Simplified calendar event representation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct CalendarEvent {
    pub id: String,
    pub summary: Option<String>,
    pub start_date_time: Option<String>,
    pub start_date: Option<String>,
    pub html_link: Option<String>,
}

impl CalendarEvent {
    /// Start of the event, preferring the time of day over an all-day date
    pub fn start(&self) -> Option<&str> {
        self.start_date_time
            .as_deref()
            .or(self.start_date.as_deref())
    }
}

/// Raw event as returned by the events list endpoint
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct ApiEvent {
    #[serde(default)]
    pub id: String,
    pub summary: Option<String>,
    pub start: Option<ApiEventDateTime>,
    pub html_link: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct ApiEventDateTime {
    pub date_time: Option<String>,
    pub date: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ApiEventList {
    #[serde(default)]
    pub items: Vec<ApiEvent>,
}

impl From<ApiEvent> for CalendarEvent {
    fn from(event: ApiEvent) -> Self {
        let (start_date_time, start_date) = match event.start {
            Some(start) => (start.date_time, start.date),
            None => (None, None),
        };

        CalendarEvent {
            id: event.id,
            summary: event.summary,
            start_date_time,
            start_date,
            html_link: event.html_link,
        }
    }
}

/// Body of an events watch request
#[derive(Debug, Clone, Serialize)]
pub struct WatchRequest {
    pub id: String,
    #[serde(rename = "type")]
    pub channel_type: String,
    pub address: String,
    pub params: WatchParams,
}

#[derive(Debug, Clone, Serialize)]
pub struct WatchParams {
    /// Channel lifetime in seconds, sent as a string
    pub ttl: String,
}

/// Push notification channel returned by a successful watch request
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WatchChannel {
    #[serde(default)]
    pub kind: String,
    pub id: String,
    pub resource_id: Option<String>,
    pub resource_uri: Option<String>,
    /// Expiry as milliseconds since the epoch, sent as a string
    pub expiration: Option<String>,
}
