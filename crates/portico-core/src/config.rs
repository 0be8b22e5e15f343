//! Application configuration

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use url::Url;

use crate::error::CoreError;
use crate::Result;

const DEFAULT_API_URL: &str = "http://localhost:3000";
const DEFAULT_TIMEOUT_SECS: u64 = 10;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Path to the database file holding the token slot
    pub database_path: PathBuf,
    /// Backend base address; `/login`, `/register` and `/user/me` hang off it
    pub api_base_url: String,
    /// Per-request timeout enforced by the HTTP client
    pub request_timeout_secs: u64,
    /// Settings key of the token slot
    pub token_key: String,
}

impl Config {
    pub fn new(data_dir: PathBuf) -> Self {
        Self {
            database_path: data_dir.join("portico.db"),
            api_base_url: DEFAULT_API_URL.to_string(),
            request_timeout_secs: DEFAULT_TIMEOUT_SECS,
            token_key: portico_session::DEFAULT_TOKEN_KEY.to_string(),
        }
    }

    pub fn data_dir() -> PathBuf {
        dirs::data_local_dir()
            .map(|d| d.join("Portico"))
            .unwrap_or_else(|| PathBuf::from(".portico"))
    }

    /// Defaults overlaid with `PORTICO_DATA_DIR`, `PORTICO_API_URL` and
    /// `PORTICO_REQUEST_TIMEOUT_SECS`
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let data_dir = lookup("PORTICO_DATA_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(Self::data_dir);
        let mut config = Self::new(data_dir);

        if let Some(raw) = lookup("PORTICO_API_URL") {
            config.api_base_url = raw.trim().to_string();
        }

        if let Some(raw) = lookup("PORTICO_REQUEST_TIMEOUT_SECS") {
            config.request_timeout_secs = raw
                .trim()
                .parse()
                .map_err(|e| CoreError::Config(format!("PORTICO_REQUEST_TIMEOUT_SECS: {e}")))?;
        }

        config.validate()?;
        Ok(config)
    }

    pub fn with_api_base_url(mut self, url: impl Into<String>) -> Self {
        self.api_base_url = url.into();
        self
    }

    /// Parsed backend base address
    pub fn api_url(&self) -> Result<Url> {
        let url = Url::parse(&self.api_base_url)
            .map_err(|e| CoreError::Config(format!("api_base_url {:?}: {e}", self.api_base_url)))?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(CoreError::Config(format!(
                "api_base_url must be http or https, got {}",
                url.scheme()
            )));
        }
        Ok(url)
    }

    pub fn validate(&self) -> Result<()> {
        self.api_url()?;
        if self.request_timeout_secs == 0 {
            return Err(CoreError::Config(
                "request_timeout_secs must be positive".to_string(),
            ));
        }
        if self.token_key.trim().is_empty() {
            return Err(CoreError::Config("token_key cannot be empty".to_string()));
        }
        Ok(())
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::new(Self::data_dir())
    }
}

// Simple dirs implementation for common directories
mod dirs {
    use std::path::PathBuf;

    pub fn data_local_dir() -> Option<PathBuf> {
        #[cfg(target_os = "windows")]
        {
            std::env::var("LOCALAPPDATA").ok().map(PathBuf::from)
        }
        #[cfg(target_os = "macos")]
        {
            std::env::var("HOME")
                .ok()
                .map(|h| PathBuf::from(h).join("Library/Application Support"))
        }
        #[cfg(target_os = "linux")]
        {
            std::env::var("XDG_DATA_HOME")
                .ok()
                .map(PathBuf::from)
                .or_else(|| {
                    std::env::var("HOME")
                        .ok()
                        .map(|h| PathBuf::from(h).join(".local/share"))
                })
        }
        #[cfg(not(any(target_os = "windows", target_os = "macos", target_os = "linux")))]
        {
            None
        }
    }
}
