use super::models::{ApiEventList, CalendarEvent, WatchChannel, WatchParams, WatchRequest};
use super::token::TokenManager;
use super::CalendarSource;
use crate::config::Config;
use crate::error::{api_error, SyncResult};
use async_trait::async_trait;
use chrono::{SecondsFormat, Utc};
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use std::sync::Arc;
use tokio::sync::OnceCell;
use tracing::{debug, info, warn};
use url::Url;

/// Calendar v3 REST client for a single calendar.
///
/// Credentials are read on the first call that needs a token, so a missing
/// credentials file fails that call instead of construction.
#[derive(Debug)]
pub struct GoogleCalendarClient {
    config: Arc<Config>,
    client: Client,
    token_manager: OnceCell<TokenManager>,
}

impl GoogleCalendarClient {
    pub fn new(config: Arc<Config>) -> Self {
        Self {
            config,
            client: Client::new(),
            token_manager: OnceCell::new(),
        }
    }

    async fn token_manager(&self) -> SyncResult<&TokenManager> {
        self.token_manager
            .get_or_try_init(|| async {
                TokenManager::from_config(&self.config, self.client.clone())
            })
            .await
    }

    /// Send a request built around the current access token.
    ///
    /// A 401 forces one token refresh and a single retry.
    async fn send_authorized<F>(&self, build: F, context: &str) -> SyncResult<Response>
    where
        F: Fn(&str) -> RequestBuilder + Send + Sync,
    {
        let token_manager = self.token_manager().await?;
        let access_token = token_manager.access_token().await?;

        let response = build(&access_token)
            .send()
            .await
            .map_err(|e| api_error(&format!("{}: {}", context, e)))?;
        if response.status() != StatusCode::UNAUTHORIZED {
            return ensure_success(response, context).await;
        }

        warn!("{}: access token rejected, refreshing", context);
        let access_token = token_manager.force_refresh().await?;
        let response = build(&access_token)
            .send()
            .await
            .map_err(|e| api_error(&format!("{}: {}", context, e)))?;

        ensure_success(response, context).await
    }

    /// `{base}/calendars/{calendar_id}/events[/{suffix}]` with the id percent-encoded
    fn events_url(&self, suffix: Option<&str>) -> SyncResult<Url> {
        let mut url = Url::parse(&self.config.api_base_url)
            .map_err(|e| api_error(&format!("Failed to parse URL: {}", e)))?;

        {
            let mut segments = url
                .path_segments_mut()
                .map_err(|_| api_error("API base URL cannot have path segments"))?;
            segments
                .pop_if_empty()
                .extend(["calendars", self.config.calendar_id.as_str(), "events"]);
            if let Some(suffix) = suffix {
                segments.push(suffix);
            }
        }

        Ok(url)
    }
}

#[async_trait]
impl CalendarSource for GoogleCalendarClient {
    async fn list_upcoming_events(&self, max_results: u32) -> SyncResult<Vec<CalendarEvent>> {
        let time_min = Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true);
        let mut url = self.events_url(None)?;
        url.query_pairs_mut()
            .append_pair("timeMin", &time_min)
            .append_pair("maxResults", &max_results.to_string())
            .append_pair("singleEvents", "true")
            .append_pair("orderBy", "startTime");

        let response = self
            .send_authorized(
                |token| self.client.get(url.clone()).bearer_auth(token),
                "Failed to fetch events",
            )
            .await?;

        let list: ApiEventList = response
            .json()
            .await
            .map_err(|e| api_error(&format!("Failed to parse events response: {}", e)))?;

        let events: Vec<CalendarEvent> = list.items.into_iter().map(CalendarEvent::from).collect();
        debug!("Fetched {} upcoming events", events.len());

        Ok(events)
    }

    async fn register_watch(&self, callback_url: &str, ttl_seconds: u64) -> SyncResult<WatchChannel> {
        // New id on every call; channels registered earlier are left running
        let request = WatchRequest {
            id: uuid::Uuid::new_v4().to_string(),
            channel_type: "web_hook".to_string(),
            address: callback_url.to_string(),
            params: WatchParams {
                ttl: ttl_seconds.to_string(),
            },
        };

        let url = self.events_url(Some("watch"))?;
        let response = self
            .send_authorized(
                |token| self.client.post(url.clone()).bearer_auth(token).json(&request),
                "Failed to register watch",
            )
            .await?;

        let channel: WatchChannel = response
            .json()
            .await
            .map_err(|e| api_error(&format!("Failed to parse watch response: {}", e)))?;
        info!(
            "Watch channel {} registered for {}, expires {}",
            channel.id,
            callback_url,
            channel.expiration.as_deref().unwrap_or("unknown")
        );

        Ok(channel)
    }
}

async fn ensure_success(response: Response, context: &str) -> SyncResult<Response> {
    if response.status().is_success() {
        return Ok(response);
    }

    let status = response.status();
    let error_body = response
        .text()
        .await
        .unwrap_or_else(|_| "Could not read error response".to_string());
    Err(api_error(&format!(
        "{}: HTTP {} - {}",
        context, status, error_body
    )))
}
