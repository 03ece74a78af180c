use super::credentials::{load_credentials, Credentials};
use super::oauth;
use crate::config::Config;
use crate::error::{auth_error, config_error, filesystem_error, SyncResult};
use chrono::Utc;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Seconds before the recorded expiry at which a token counts as expired
const EXPIRY_SKEW_SECS: i64 = 60;

/// Token cache contents
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "TokenFile")]
pub struct StoredToken {
    pub access_token: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<String>,
    /// Unix timestamp in seconds
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scope: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub token_type: Option<String>,
}

/// Token file as read from disk; also accepts the googleapis layout with
/// `expiry_date` in milliseconds
#[derive(Debug, Deserialize)]
struct TokenFile {
    access_token: String,
    refresh_token: Option<String>,
    expires_at: Option<i64>,
    expiry_date: Option<i64>,
    scope: Option<String>,
    token_type: Option<String>,
}

impl From<TokenFile> for StoredToken {
    fn from(file: TokenFile) -> Self {
        Self {
            access_token: file.access_token,
            refresh_token: file.refresh_token,
            expires_at: file.expires_at.or(file.expiry_date.map(|ms| ms / 1000)),
            scope: file.scope,
            token_type: file.token_type,
        }
    }
}

impl StoredToken {
    /// Build a cache entry from a token endpoint response.
    ///
    /// Refresh responses usually omit `refresh_token`; the previous one is kept then.
    pub fn from_response(response: TokenResponse, previous_refresh_token: Option<String>) -> Self {
        let expires_in = response.expires_in.unwrap_or(3600);

        Self {
            access_token: response.access_token,
            refresh_token: response.refresh_token.or(previous_refresh_token),
            expires_at: Some(Utc::now().timestamp() + expires_in),
            scope: response.scope,
            token_type: response.token_type,
        }
    }

    /// Without a recorded expiry the token counts as expired whenever it can be refreshed
    pub fn is_expired(&self, now: i64) -> bool {
        match self.expires_at {
            Some(expires_at) => expires_at - EXPIRY_SKEW_SECS <= now,
            None => self.refresh_token.is_some(),
        }
    }
}

/// Token endpoint response
#[derive(Debug, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    pub refresh_token: Option<String>,
    pub expires_in: Option<i64>,
    pub scope: Option<String>,
    pub token_type: Option<String>,
}

/// Reads, creates and refreshes the cached OAuth token
#[derive(Debug, Clone)]
pub struct TokenManager {
    credentials: Credentials,
    token_path: PathBuf,
    token_url: String,
    client: Client,
    interactive: bool,
}

impl TokenManager {
    pub fn new(
        credentials: Credentials,
        token_path: impl Into<PathBuf>,
        token_url: impl Into<String>,
        client: Client,
    ) -> Self {
        Self {
            credentials,
            token_path: token_path.into(),
            token_url: token_url.into(),
            client,
            interactive: false,
        }
    }

    /// Allow the browser consent flow when no token is cached
    pub fn with_interactive(mut self, interactive: bool) -> Self {
        self.interactive = interactive;
        self
    }

    /// Load the client credentials named by the config
    pub fn from_config(config: &Config, client: Client) -> SyncResult<Self> {
        let credentials = load_credentials(&config.credentials_path)?;
        Ok(Self::new(
            credentials,
            config.token_path.clone(),
            config.token_url.clone(),
            client,
        )
        .with_interactive(config.interactive_auth))
    }

    /// Return the cached token.
    ///
    /// When there is none, runs the interactive flow if enabled, otherwise fails
    /// with an authorization error.
    pub async fn load_or_create_authorization(&self) -> SyncResult<StoredToken> {
        if let Some(token) = load_token(&self.token_path).await? {
            return Ok(token);
        }

        if !self.interactive {
            return Err(auth_error(&format!(
                "No cached token at {}, run get_calendar_token first",
                self.token_path.display()
            )));
        }

        info!(
            "No cached token at {}, starting interactive authorization",
            self.token_path.display()
        );
        let token =
            oauth::authorize_interactively(&self.credentials, &self.client, &self.token_url)
                .await?;
        save_token(&self.token_path, &token).await?;
        info!("Token saved to {}", self.token_path.display());

        Ok(token)
    }

    /// Get a bearer token, refreshing and persisting it if it has expired
    pub async fn access_token(&self) -> SyncResult<String> {
        let token = self.load_or_create_authorization().await?;

        if !token.is_expired(Utc::now().timestamp()) {
            return Ok(token.access_token);
        }

        debug!("Cached access token expired, refreshing");
        let refreshed = self.refresh_token(&token).await?;
        Ok(refreshed.access_token)
    }

    /// Refresh regardless of the recorded expiry, for tokens the API rejected
    pub async fn force_refresh(&self) -> SyncResult<String> {
        let token = self.load_or_create_authorization().await?;
        let refreshed = self.refresh_token(&token).await?;
        Ok(refreshed.access_token)
    }

    /// Refresh an expired token
    async fn refresh_token(&self, token: &StoredToken) -> SyncResult<StoredToken> {
        let refresh_token = token
            .refresh_token
            .clone()
            .ok_or_else(|| auth_error("Access token expired and no refresh token is cached"))?;

        let params = [
            ("client_id", self.credentials.client_id.clone()),
            ("client_secret", self.credentials.client_secret.clone()),
            ("refresh_token", refresh_token.clone()),
            ("grant_type", "refresh_token".to_string()),
        ];

        let response = request_token(&self.client, &self.token_url, &params).await?;
        let refreshed = StoredToken::from_response(response, Some(refresh_token));

        save_token(&self.token_path, &refreshed).await?;
        info!("Refreshed token saved to {}", self.token_path.display());

        Ok(refreshed)
    }
}

/// POST a form to the token endpoint
pub(crate) async fn request_token(
    client: &Client,
    token_url: &str,
    params: &[(&str, String)],
) -> SyncResult<TokenResponse> {
    let response = client
        .post(token_url)
        .form(params)
        .send()
        .await
        .map_err(|e| auth_error(&format!("Token request failed: {}", e)))?;

    if !response.status().is_success() {
        let status = response.status();
        let error_body = response
            .text()
            .await
            .unwrap_or_else(|_| "Could not read error response".to_string());
        return Err(auth_error(&format!(
            "Token request failed: HTTP {} - {}",
            status, error_body
        )));
    }

    response
        .json()
        .await
        .map_err(|e| auth_error(&format!("Failed to parse token response: {}", e)))
}

/// Read the token cache; `None` when the file does not exist
pub async fn load_token(path: &Path) -> SyncResult<Option<StoredToken>> {
    match tokio::fs::read_to_string(path).await {
        Ok(content) => serde_json::from_str(&content).map(Some).map_err(|e| {
            config_error(&format!("Invalid token file {}: {}", path.display(), e))
        }),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
        Err(e) => Err(config_error(&format!(
            "Failed to read token file {}: {}",
            path.display(),
            e
        ))),
    }
}

/// Overwrite the token cache
pub async fn save_token(path: &Path, token: &StoredToken) -> SyncResult<()> {
    let json = serde_json::to_string_pretty(token)?;
    tokio::fs::write(path, json).await.map_err(|e| {
        filesystem_error(&format!(
            "Failed to write token file {}: {}",
            path.display(),
            e
        ))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;

    fn token(expires_at: Option<i64>) -> StoredToken {
        StoredToken {
            access_token: "access".to_string(),
            refresh_token: Some("refresh".to_string()),
            expires_at,
            scope: None,
            token_type: Some("Bearer".to_string()),
        }
    }

    #[test]
    fn test_expiry_uses_skew() {
        let now = 1_700_000_000;
        assert!(!token(Some(now + 3600)).is_expired(now));
        assert!(token(Some(now + 30)).is_expired(now));
        assert!(token(Some(now - 1)).is_expired(now));
    }

    #[test]
    fn test_missing_expiry_is_expired_only_when_refreshable() {
        let now = 1_700_000_000;
        assert!(token(None).is_expired(now));

        let no_refresh = StoredToken {
            refresh_token: None,
            ..token(None)
        };
        assert!(!no_refresh.is_expired(now));
    }

    #[test]
    fn test_googleapis_expiry_date_is_read_as_seconds() {
        let stored: StoredToken = serde_json::from_str(
            r#"{"access_token":"a","refresh_token":"r","scope":"s","token_type":"Bearer","expiry_date":1600000000000}"#,
        )
        .unwrap();

        assert_eq!(stored.expires_at, Some(1_600_000_000));
        assert!(stored.is_expired(1_700_000_000));

        let written = serde_json::to_value(&stored).unwrap();
        assert_eq!(written["expires_at"], 1_600_000_000);
        assert!(written.get("expiry_date").is_none());
    }

    #[tokio::test]
    async fn test_missing_token_without_interactive_flow_is_auth_error() {
        let dir = tempfile::tempdir().unwrap();
        let token_path = dir.path().join("token.json");
        let credentials = Credentials {
            client_id: "id".to_string(),
            client_secret: "secret".to_string(),
            redirect_uri: "http://localhost:8080".to_string(),
        };
        let manager = TokenManager::new(credentials, &token_path, "http://127.0.0.1:9/token", Client::new());

        let err = manager.access_token().await.unwrap_err();

        assert!(matches!(err, Error::Auth(ref m) if m.contains("get_calendar_token")));
        assert!(!token_path.exists());
    }

    #[test]
    fn test_refresh_response_keeps_previous_refresh_token() {
        let response = TokenResponse {
            access_token: "new".to_string(),
            refresh_token: None,
            expires_in: Some(3599),
            scope: None,
            token_type: Some("Bearer".to_string()),
        };
        let stored = StoredToken::from_response(response, Some("old-refresh".to_string()));

        assert_eq!(stored.access_token, "new");
        assert_eq!(stored.refresh_token.as_deref(), Some("old-refresh"));
        assert!(stored.expires_at.unwrap() > Utc::now().timestamp());
    }

    #[tokio::test]
    async fn test_load_token_missing_file_is_none() {
        let dir = tempfile::tempdir().unwrap();
        let loaded = load_token(&dir.path().join("token.json")).await.unwrap();
        assert!(loaded.is_none());
    }

    #[tokio::test]
    async fn test_save_then_load_token() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("token.json");
        let original = token(Some(1_700_000_000));

        save_token(&path, &original).await.unwrap();
        let loaded = load_token(&path).await.unwrap();

        assert_eq!(loaded, Some(original));
    }

    #[tokio::test]
    async fn test_malformed_token_file_is_config_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("token.json");
        std::fs::write(&path, "[]").unwrap();

        assert!(matches!(load_token(&path).await, Err(Error::Config(_))));
    }
}
