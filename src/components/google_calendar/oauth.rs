//! Interactive OAuth consent flow for installed applications.
//!
//! Opens the consent page in a browser, receives the single redirect on a
//! loopback address and exchanges the authorization code for a token.

use super::credentials::Credentials;
use super::token::{request_token, StoredToken};
use crate::error::{auth_error, SyncResult};
use reqwest::Client;
use std::time::Duration;
use tracing::{info, warn};
use url::Url;

const AUTH_URL: &str = "https://accounts.google.com/o/oauth2/v2/auth";

/// Read-only access to calendar events
pub const SCOPES: &str = "https://www.googleapis.com/auth/calendar.readonly";

/// Port used when the configured redirect URI does not name one
const DEFAULT_REDIRECT_PORT: u16 = 8080;

const CALLBACK_TIMEOUT: Duration = Duration::from_secs(120);

/// Run the consent flow and return a fresh token; the caller persists it
pub async fn authorize_interactively(
    credentials: &Credentials,
    client: &Client,
    token_url: &str,
) -> SyncResult<StoredToken> {
    let redirect_uri = loopback_redirect_uri(&credentials.redirect_uri)?;
    let state = uuid::Uuid::new_v4().to_string();
    let auth_url = build_auth_url(&credentials.client_id, &redirect_uri, &state)?;

    info!("Opening browser for Google Calendar authorization...");
    if let Err(e) = webbrowser::open(&auth_url) {
        warn!("{}", manual_visit_message(&auth_url, &e.to_string()));
    }

    let listen_addr = listen_address(&redirect_uri)?;
    info!("Waiting for authorization callback on {}", listen_addr);

    let code = tokio::task::spawn_blocking(move || wait_for_callback(&listen_addr, &state))
        .await
        .map_err(|e| auth_error(&format!("Authorization callback task failed: {}", e)))??;

    let params = [
        ("client_id", credentials.client_id.clone()),
        ("client_secret", credentials.client_secret.clone()),
        ("code", code),
        ("redirect_uri", redirect_uri),
        ("grant_type", "authorization_code".to_string()),
    ];
    let response = request_token(client, token_url, &params).await?;

    Ok(StoredToken::from_response(response, None))
}

/// Consent page URL requesting offline access
pub fn build_auth_url(client_id: &str, redirect_uri: &str, state: &str) -> SyncResult<String> {
    let url = Url::parse_with_params(
        AUTH_URL,
        &[
            ("client_id", client_id),
            ("redirect_uri", redirect_uri),
            ("response_type", "code"),
            ("access_type", "offline"),
            ("prompt", "consent"),
            ("scope", SCOPES),
            ("state", state),
        ],
    )
    .map_err(|e| auth_error(&format!("Failed to build authorization URL: {}", e)))?;

    Ok(url.to_string())
}

/// Shown when no browser could be opened so the user can finish by hand
pub fn manual_visit_message(auth_url: &str, reason: &str) -> String {
    format!(
        "Could not open a browser ({}), visit this URL manually: {}",
        reason, auth_url
    )
}

/// Pin a port on loopback redirect URIs that do not carry one
pub fn loopback_redirect_uri(redirect_uri: &str) -> SyncResult<String> {
    let mut url = Url::parse(redirect_uri)
        .map_err(|e| auth_error(&format!("Invalid redirect URI {}: {}", redirect_uri, e)))?;

    if url.port().is_none() {
        url.set_port(Some(DEFAULT_REDIRECT_PORT))
            .map_err(|_| auth_error(&format!("Cannot set a port on {}", redirect_uri)))?;
    }

    Ok(url.to_string())
}

fn listen_address(redirect_uri: &str) -> SyncResult<String> {
    let url = Url::parse(redirect_uri)
        .map_err(|e| auth_error(&format!("Invalid redirect URI {}: {}", redirect_uri, e)))?;
    let port = url.port_or_known_default().unwrap_or(DEFAULT_REDIRECT_PORT);

    Ok(format!("127.0.0.1:{}", port))
}

/// Pull the authorization code out of the redirect request path
pub fn extract_code(request_url: &str, expected_state: &str) -> SyncResult<String> {
    let parsed = Url::parse(&format!("http://localhost{}", request_url))
        .map_err(|e| auth_error(&format!("Failed to parse callback URL: {}", e)))?;

    let param = |name: &str| {
        parsed
            .query_pairs()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.into_owned())
    };

    if let Some(error) = param("error") {
        return Err(auth_error(&format!("Authorization denied: {}", error)));
    }
    if param("state").as_deref() != Some(expected_state) {
        return Err(auth_error("Authorization callback state does not match"));
    }

    param("code").ok_or_else(|| auth_error("No authorization code found in callback"))
}

fn wait_for_callback(listen_addr: &str, expected_state: &str) -> SyncResult<String> {
    let server = tiny_http::Server::http(listen_addr).map_err(|e| {
        auth_error(&format!("Failed to start callback server on {}: {}", listen_addr, e))
    })?;

    let request = server
        .recv_timeout(CALLBACK_TIMEOUT)
        .map_err(|e| auth_error(&format!("Callback server error: {}", e)))?
        .ok_or_else(|| auth_error("Timed out waiting for the authorization callback"))?;

    let result = extract_code(request.url(), expected_state);
    let message = match &result {
        Ok(_) => "Authorization successful! You can close this window.".to_string(),
        Err(e) => format!("Authorization failed: {}", e),
    };
    if let Err(e) = request.respond(tiny_http::Response::from_string(message)) {
        warn!("Failed to answer the authorization callback: {}", e);
    }

    result
}
