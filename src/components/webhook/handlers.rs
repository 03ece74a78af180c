use axum::{
    extract::State,
    http::{HeaderMap, StatusCode},
    response::IntoResponse,
};
use tracing::{debug, error, info};

use crate::context::AppContext;
use crate::sync::sync_daily_note;

/// Notification state sent with every push message
pub const RESOURCE_STATE_HEADER: &str = "x-goog-resource-state";
const CHANNEL_ID_HEADER: &str = "x-goog-channel-id";
const RESOURCE_ID_HEADER: &str = "x-goog-resource-id";
const MESSAGE_NUMBER_HEADER: &str = "x-goog-message-number";

/// Whether a notification state should trigger a sync
pub fn should_sync(resource_state: Option<&str>) -> bool {
    matches!(resource_state, Some("exists") | Some("sync"))
}

fn header<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers.get(name).and_then(|value| value.to_str().ok())
}

/// Handler for push notifications.
///
/// Always answers 200 so the sender keeps the channel alive.
pub async fn webhook_handler(
    State(ctx): State<AppContext>,
    headers: HeaderMap,
) -> impl IntoResponse {
    let resource_state = header(&headers, RESOURCE_STATE_HEADER);
    info!(
        "Webhook received: state={} channel={} resource={} message={}",
        resource_state.unwrap_or("-"),
        header(&headers, CHANNEL_ID_HEADER).unwrap_or("-"),
        header(&headers, RESOURCE_ID_HEADER).unwrap_or("-"),
        header(&headers, MESSAGE_NUMBER_HEADER).unwrap_or("-")
    );

    if should_sync(resource_state) {
        info!("Calendar updated, fetching new events...");
        if let Err(e) = sync_daily_note(&ctx).await {
            error!("Webhook-triggered sync failed: {}", e);
        }
    } else {
        debug!("Ignoring notification state {:?}", resource_state);
    }

    (StatusCode::OK, "OK")
}

/// Liveness check
pub async fn health_handler() -> impl IntoResponse {
    (StatusCode::OK, "OK")
}
