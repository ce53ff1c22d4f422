use crate::models::{RemoteError, SlotKind, SlotStatus};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("config error: {0}")]
    Config(String),

    #[error("validation failed: {0}")]
    Validation(String),

    #[error("credential configuration incomplete")]
    IncompleteConfiguration,

    #[error("{slot} credential cannot be tested while {status}")]
    SlotNotTestable { slot: SlotKind, status: SlotStatus },

    #[error("a save is already in progress")]
    SaveInFlight,

    #[error("not authenticated: log in first or set CREDGATE_SESSION_TOKEN")]
    NotAuthenticated,

    #[error("unauthorized: {0}")]
    Unauthorized(String),

    #[error("backend error [{}]: {}", .0.code, .0.message)]
    Remote(RemoteError),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Http(#[from] reqwest::Error),

    #[error(transparent)]
    Keyring(#[from] keyring::Error),

    #[error(transparent)]
    Settings(#[from] ::config::ConfigError),

    #[error(transparent)]
    TomlSer(#[from] toml::ser::Error),
}

impl AppError {
    /// Text suitable for a transient banner. Remote failures pass through the
    /// backend's own message; transport failures get a fixed phrase.
    pub fn user_message(&self) -> String {
        match self {
            AppError::Remote(remote) => remote.message.clone(),
            AppError::Unauthorized(message) => message.clone(),
            AppError::Http(e) if e.is_timeout() => "connection timed out".to_string(),
            AppError::Http(_) => "network request failed".to_string(),
            AppError::Json(_) => "unexpected response from server".to_string(),
            AppError::Io(_) | AppError::Settings(_) | AppError::TomlSer(_) => {
                "local configuration could not be read or written".to_string()
            }
            AppError::Keyring(_) => "system keychain unavailable".to_string(),
            other => other.to_string(),
        }
    }
}
