use miette::Diagnostic;
use thiserror::Error;

/// Main error type for the application
#[derive(Debug, Error, Diagnostic)]
pub enum Error {
    #[error("Configuration error: {0}")]
    #[diagnostic(code(vaultcal::config))]
    Config(String),

    #[error("Authorization error: {0}")]
    #[diagnostic(code(vaultcal::auth))]
    Auth(String),

    #[error("Google Calendar API error: {0}")]
    #[diagnostic(code(vaultcal::api))]
    Api(String),

    #[error("File system error: {0}")]
    #[diagnostic(code(vaultcal::filesystem))]
    FileSystem(String),

    #[error("Environment error: {0}")]
    #[diagnostic(code(vaultcal::environment))]
    Environment(String),

    #[error("Serialization error: {0}")]
    #[diagnostic(code(vaultcal::serialization))]
    Serialization(String),

    #[error(transparent)]
    #[diagnostic(code(vaultcal::io))]
    Io(#[from] std::io::Error),

    #[error("Other error: {0}")]
    #[diagnostic(code(vaultcal::other))]
    Other(String),
}

impl From<toml::de::Error> for Error {
    fn from(err: toml::de::Error) -> Self {
        Error::Serialization(err.to_string())
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Serialization(err.to_string())
    }
}

/// Type alias for Result with our Error type
pub type SyncResult<T> = Result<T, Error>;

/// Helper to create environment errors
pub fn env_error(var: &str) -> Error {
    Error::Environment(format!("Invalid environment variable: {}", var))
}

/// Helper to create configuration errors
pub fn config_error(message: &str) -> Error {
    Error::Config(message.to_string())
}

/// Helper to create authorization errors
pub fn auth_error(message: &str) -> Error {
    Error::Auth(message.to_string())
}

/// Helper to create Google Calendar API errors
pub fn api_error(message: &str) -> Error {
    Error::Api(message.to_string())
}

/// Helper to create file system errors
pub fn filesystem_error(message: &str) -> Error {
    Error::FileSystem(message.to_string())
}
