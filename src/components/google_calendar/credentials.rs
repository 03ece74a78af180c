use crate::error::{config_error, SyncResult};
use serde::Deserialize;
use std::path::Path;

/// OAuth client configuration, immutable for the life of the process
#[derive(Debug, Clone, PartialEq)]
pub struct Credentials {
    pub client_id: String,
    pub client_secret: String,
    pub redirect_uri: String,
}

/// Layout of the client file downloaded from the Google Cloud console
#[derive(Debug, Deserialize)]
struct CredentialsFile {
    installed: Option<ClientSection>,
    web: Option<ClientSection>,
}

#[derive(Debug, Deserialize)]
struct ClientSection {
    client_id: String,
    client_secret: String,
    #[serde(default)]
    redirect_uris: Vec<String>,
}

/// Read the OAuth client file; a missing or malformed file is a configuration error
pub fn load_credentials(path: impl AsRef<Path>) -> SyncResult<Credentials> {
    let path = path.as_ref();

    let content = std::fs::read_to_string(path).map_err(|e| {
        config_error(&format!(
            "Failed to read credentials file {}: {}",
            path.display(),
            e
        ))
    })?;

    parse_credentials(&content)
        .map_err(|e| config_error(&format!("Invalid credentials file {}: {}", path.display(), e)))
}

fn parse_credentials(content: &str) -> Result<Credentials, String> {
    let file: CredentialsFile = serde_json::from_str(content).map_err(|e| e.to_string())?;

    let section = file
        .installed
        .or(file.web)
        .ok_or_else(|| "expected an \"installed\" or \"web\" client".to_string())?;

    let redirect_uri = section
        .redirect_uris
        .into_iter()
        .next()
        .ok_or_else(|| "no redirect_uris configured".to_string())?;

    Ok(Credentials {
        client_id: section.client_id,
        client_secret: section.client_secret,
        redirect_uri,
    })
}
