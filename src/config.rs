use crate::error::AppError;
use crate::validator::is_valid_url;
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

pub const SERVICE_NAME: &str = "credgate";
const SESSION_ENTRY: &str = "session";
const SESSION_ENV: &str = "CREDGATE_SESSION_TOKEN";
const ENV_PREFIX: &str = "CREDGATE";

fn app_home_dir() -> Result<PathBuf, AppError> {
    if let Ok(custom) = std::env::var("CREDGATE_HOME") {
        return Ok(PathBuf::from(custom));
    }

    if let Some(dirs) = ProjectDirs::from("com", "credgate", SERVICE_NAME) {
        let candidate = dirs.data_local_dir().to_path_buf();
        if fs::create_dir_all(&candidate).is_ok() {
            return Ok(candidate);
        }
    }

    let cwd = std::env::current_dir()?;
    Ok(cwd.join(".credgate"))
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct AppConfig {
    /// Base of the configuration API, e.g. `http://localhost:3000/api/v1`.
    pub backend_url: String,
    pub connect_timeout_secs: u64,
    pub request_timeout_secs: u64,
    pub config_cache_ttl_secs: u64,
    pub log_level: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            backend_url: "http://localhost:3000/api/v1".into(),
            connect_timeout_secs: 10,
            request_timeout_secs: 30,
            config_cache_ttl_secs: 300,
            log_level: "warn".into(),
        }
    }
}

pub fn config_dir() -> Result<PathBuf, AppError> {
    Ok(app_home_dir()?.join("config"))
}

pub fn config_path() -> Result<PathBuf, AppError> {
    Ok(config_dir()?.join("config.toml"))
}

pub fn ensure_dirs() -> Result<(), AppError> {
    fs::create_dir_all(config_dir()?)?;
    Ok(())
}

pub fn load_config() -> Result<AppConfig, AppError> {
    load_config_from(&config_path()?)
}

/// Layers the TOML file (if present) and `CREDGATE_*` environment variables
/// over the built-in defaults.
pub fn load_config_from(path: &Path) -> Result<AppConfig, AppError> {
    let parsed: AppConfig = ::config::Config::builder()
        .add_source(::config::File::from(path).required(false))
        .add_source(::config::Environment::with_prefix(ENV_PREFIX))
        .build()?
        .try_deserialize()?;

    if !is_valid_url(parsed.backend_url.trim()) {
        return Err(AppError::Config(format!(
            "backend_url '{}' is not a valid HTTP/HTTPS address",
            parsed.backend_url
        )));
    }

    Ok(AppConfig {
        backend_url: parsed.backend_url.trim().trim_end_matches('/').to_string(),
        ..parsed
    })
}

pub fn save_config(config: &AppConfig) -> Result<(), AppError> {
    ensure_dirs()?;
    let path = config_path()?;
    let raw = toml::to_string_pretty(config)?;
    fs::write(path, raw)?;
    Ok(())
}

pub fn ensure_initialized() -> Result<(), AppError> {
    ensure_dirs()?;
    let cfg_path = config_path()?;
    if !Path::new(&cfg_path).exists() {
        save_config(&AppConfig::default())?;
    }
    Ok(())
}

pub fn set_session_token(token: &str) -> Result<(), AppError> {
    let entry = keyring::Entry::new(SERVICE_NAME, SESSION_ENTRY)?;
    entry.set_password(token.trim())?;
    Ok(())
}

pub fn delete_session_token() -> Result<(), AppError> {
    let entry = keyring::Entry::new(SERVICE_NAME, SESSION_ENTRY)?;
    match entry.delete_credential() {
        Ok(()) => Ok(()),
        Err(keyring::Error::NoEntry) => Ok(()),
        Err(e) => Err(AppError::Keyring(e)),
    }
}

/// Keychain first, then `CREDGATE_SESSION_TOKEN`. Keychain failures fall
/// through to the environment.
pub fn session_token() -> Option<String> {
    if let Ok(entry) = keyring::Entry::new(SERVICE_NAME, SESSION_ENTRY) {
        if let Ok(value) = entry.get_password() {
            if !value.is_empty() {
                return Some(value);
            }
        }
    }

    std::env::var(SESSION_ENV)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
