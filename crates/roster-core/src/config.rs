//! Client configuration
//!
//! Values come from explicit overrides (CLI flags) first, then environment
//! variables, then defaults.

use std::path::PathBuf;

use crate::error::{Error, Result};
use crate::models::RegisterContract;

pub const ENV_API_ENDPOINT: &str = "ROSTER_API_ENDPOINT";
pub const ENV_SESSION_PATH: &str = "ROSTER_SESSION_PATH";
pub const ENV_REQUIRE_AUTH_FOR_REGISTRATION: &str = "ROSTER_REQUIRE_AUTH_FOR_REGISTRATION";
pub const ENV_REGISTER_CONTRACT: &str = "ROSTER_REGISTER_CONTRACT";

/// Effective client configuration
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// API base URL, without trailing slash
    pub base_url: String,
    /// File holding the persisted credential
    pub session_path: PathBuf,
    /// Send the bearer token when creating users through the registration endpoint
    pub require_auth_for_registration: bool,
    /// Field naming of the registration body
    pub register_contract: RegisterContract,
}

impl ClientConfig {
    pub fn new(base_url: &str, session_path: PathBuf) -> Result<Self> {
        Ok(Self {
            base_url: normalize_base_url(base_url)?,
            session_path,
            require_auth_for_registration: false,
            register_contract: RegisterContract::default(),
        })
    }

    /// Build from environment variables, with `api_url` and `session_path`
    /// taking precedence when given
    pub fn from_env(api_url: Option<&str>, session_path: Option<&str>) -> Result<Self> {
        let base_url = match api_url {
            Some(url) => url.to_string(),
            None => std::env::var(ENV_API_ENDPOINT).map_err(|_| {
                Error::config(format!(
                    "API endpoint not set. Use --api-url or set {}",
                    ENV_API_ENDPOINT
                ))
            })?,
        };

        let session_path = resolve_session_path(session_path)?;

        let mut config = Self::new(&base_url, session_path)?;

        if let Ok(value) = std::env::var(ENV_REQUIRE_AUTH_FOR_REGISTRATION) {
            config.require_auth_for_registration = parse_bool(&value).ok_or_else(|| {
                Error::config(format!(
                    "{} must be true or false, got '{}'",
                    ENV_REQUIRE_AUTH_FOR_REGISTRATION, value
                ))
            })?;
        }

        if let Ok(value) = std::env::var(ENV_REGISTER_CONTRACT) {
            config.register_contract = value.parse()?;
        }

        Ok(config)
    }

    /// Absolute URL for an API path such as `/api/users`
    pub fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }
}

/// Session file location: explicit path if given, otherwise [`get_session_path`]
pub fn resolve_session_path(path: Option<&str>) -> Result<PathBuf> {
    match path {
        Some(path) => Ok(expand_path(path)),
        None => get_session_path(),
    }
}

/// Session file location: `ROSTER_SESSION_PATH` or the per-user data directory
pub fn get_session_path() -> Result<PathBuf> {
    if let Ok(path) = std::env::var(ENV_SESSION_PATH) {
        return Ok(expand_path(&path));
    }

    let dirs = directories::ProjectDirs::from("com", "roster", "Roster")
        .ok_or_else(|| Error::config("Could not determine project directories"))?;

    Ok(dirs.data_dir().join("session.json"))
}

fn expand_path(path: &str) -> PathBuf {
    PathBuf::from(shellexpand::tilde(path).into_owned())
}

fn normalize_base_url(url: &str) -> Result<String> {
    let trimmed = url.trim().trim_end_matches('/');
    if !(trimmed.starts_with("http://") || trimmed.starts_with("https://")) {
        return Err(Error::config(format!(
            "API endpoint must start with http:// or https://, got '{}'",
            url
        )));
    }
    Ok(trimmed.to_string())
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
