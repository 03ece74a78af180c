use crate::error::{env_error, SyncResult};
use dotenvy::dotenv;
use serde::Deserialize;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

/// Callback address used until a real public URL is configured
pub const PLACEHOLDER_CALLBACK_URL: &str = "https://your-public-url.com/webhook";

/// Default location of the optional TOML configuration file
pub const DEFAULT_CONFIG_FILE: &str = "config/vaultcal.toml";

/// Main configuration structure for the sync service
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    /// Directory the daily notes are written to
    pub vault_dir: PathBuf,
    /// Public address Google Calendar pushes change notifications to
    pub callback_url: String,
    /// Local port the webhook listener binds
    pub port: u16,
    /// OAuth client credential file
    pub credentials_path: PathBuf,
    /// Cached OAuth token file
    pub token_path: PathBuf,
    /// Google Calendar ID to sync
    pub calendar_id: String,
    /// Maximum number of upcoming events per sync
    pub max_results: u32,
    /// Lifetime requested for each watch channel
    pub watch_ttl_seconds: u64,
    /// Base URL of the Calendar v3 REST API
    pub api_base_url: String,
    /// OAuth token endpoint
    pub token_url: String,
    /// Run the browser consent flow when no token is cached
    pub interactive_auth: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            vault_dir: PathBuf::from("./vault/Calendar"),
            callback_url: PLACEHOLDER_CALLBACK_URL.to_string(),
            port: 3000,
            credentials_path: PathBuf::from("credentials.json"),
            token_path: PathBuf::from("token.json"),
            calendar_id: "primary".to_string(),
            max_results: 10,
            watch_ttl_seconds: 86400,
            api_base_url: "https://www.googleapis.com/calendar/v3".to_string(),
            token_url: "https://oauth2.googleapis.com/token".to_string(),
            interactive_auth: false,
        }
    }
}

/// Values accepted in the TOML configuration file; every key is optional
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct FileConfig {
    vault_dir: Option<PathBuf>,
    callback_url: Option<String>,
    port: Option<u16>,
    credentials_path: Option<PathBuf>,
    token_path: Option<PathBuf>,
    calendar_id: Option<String>,
    max_results: Option<u32>,
    watch_ttl_seconds: Option<u64>,
    api_base_url: Option<String>,
    token_url: Option<String>,
    interactive_auth: Option<bool>,
}

impl Config {
    /// Load configuration from `.env`, the optional config file and the environment
    pub fn load() -> SyncResult<Self> {
        // Load .env file if it exists
        dotenv().ok();

        let config_file =
            env::var("VAULTCAL_CONFIG").unwrap_or_else(|_| DEFAULT_CONFIG_FILE.to_string());

        let mut config = Config::default();
        if Path::new(&config_file).exists() {
            config.merge_file(&config_file)?;
        }
        config.merge_env()?;

        Ok(config)
    }

    /// Overlay the values present in a TOML file
    pub fn merge_file(&mut self, path: impl AsRef<Path>) -> SyncResult<()> {
        let content = fs::read_to_string(path)?;
        let file: FileConfig = toml::from_str(&content)?;

        if let Some(v) = file.vault_dir {
            self.vault_dir = v;
        }
        if let Some(v) = file.callback_url {
            self.callback_url = v;
        }
        if let Some(v) = file.port {
            self.port = v;
        }
        if let Some(v) = file.credentials_path {
            self.credentials_path = v;
        }
        if let Some(v) = file.token_path {
            self.token_path = v;
        }
        if let Some(v) = file.calendar_id {
            self.calendar_id = v;
        }
        if let Some(v) = file.max_results {
            self.max_results = v;
        }
        if let Some(v) = file.watch_ttl_seconds {
            self.watch_ttl_seconds = v;
        }
        if let Some(v) = file.api_base_url {
            self.api_base_url = v;
        }
        if let Some(v) = file.token_url {
            self.token_url = v;
        }
        if let Some(v) = file.interactive_auth {
            self.interactive_auth = v;
        }

        Ok(())
    }

    /// Overlay the values present in the process environment
    fn merge_env(&mut self) -> SyncResult<()> {
        if let Ok(v) = env::var("VAULT_DIR") {
            self.vault_dir = PathBuf::from(v);
        }
        if let Ok(v) = env::var("CALLBACK_URL") {
            self.callback_url = v;
        }
        if let Some(v) = parse_env("PORT")? {
            self.port = v;
        }
        if let Ok(v) = env::var("GOOGLE_CREDENTIALS_PATH") {
            self.credentials_path = PathBuf::from(v);
        }
        if let Ok(v) = env::var("GOOGLE_TOKEN_PATH") {
            self.token_path = PathBuf::from(v);
        }
        if let Ok(v) = env::var("GOOGLE_CALENDAR_ID") {
            self.calendar_id = v;
        }
        if let Some(v) = parse_env("MAX_RESULTS")? {
            self.max_results = v;
        }
        if let Some(v) = parse_env("WATCH_TTL_SECONDS")? {
            self.watch_ttl_seconds = v;
        }
        if let Ok(v) = env::var("GOOGLE_API_BASE_URL") {
            self.api_base_url = v;
        }
        if let Ok(v) = env::var("GOOGLE_TOKEN_URL") {
            self.token_url = v;
        }
        if let Some(v) = parse_env("INTERACTIVE_AUTH")? {
            self.interactive_auth = v;
        }

        Ok(())
    }

    /// Whether the callback URL is still the placeholder
    pub fn has_placeholder_callback(&self) -> bool {
        self.callback_url == PLACEHOLDER_CALLBACK_URL
    }
}

fn parse_env<T: FromStr>(var: &str) -> SyncResult<Option<T>> {
    match env::var(var) {
        Ok(value) => value.trim().parse::<T>().map(Some).map_err(|_| env_error(var)),
        Err(_) => Ok(None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_default_values() {
        let config = Config::default();
        assert_eq!(config.port, 3000);
        assert_eq!(config.calendar_id, "primary");
        assert_eq!(config.max_results, 10);
        assert_eq!(config.watch_ttl_seconds, 86400);
        assert!(config.has_placeholder_callback());
        assert!(!config.interactive_auth);
    }

    #[test]
    fn test_file_overrides_only_present_keys() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            "vault_dir = \"/tmp/notes\"\ncallback_url = \"https://example.org/webhook\"\nport = 8081\ninteractive_auth = true"
        )
        .unwrap();

        let mut config = Config::default();
        config.merge_file(file.path()).unwrap();

        assert_eq!(config.vault_dir, PathBuf::from("/tmp/notes"));
        assert_eq!(config.callback_url, "https://example.org/webhook");
        assert_eq!(config.port, 8081);
        assert!(config.interactive_auth);
        assert_eq!(config.token_path, PathBuf::from("token.json"));
        assert!(!config.has_placeholder_callback());
    }

    #[test]
    fn test_unknown_file_key_is_rejected() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "obsidian_path = \"/tmp\"").unwrap();

        let mut config = Config::default();
        let err = config.merge_file(file.path()).unwrap_err();
        assert!(matches!(err, crate::error::Error::Serialization(_)));
    }
}
