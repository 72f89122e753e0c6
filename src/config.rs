use std::fs;
use std::path::{ Path, PathBuf };
use std::time::Duration;

use log::{ debug, info };
use serde::{ Deserialize, Serialize };
use thiserror::Error;

pub const DEFAULT_API_URL: &str = "http://localhost:5004/api";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    FileReadError(#[from] std::io::Error),

    #[error("Failed to parse config file: {0}")]
    ParseError(#[from] serde_yaml::Error),

    #[error("Invalid value for {key}: {value}")] InvalidValue {
        key: String,
        value: String,
    },

    #[error("No data directory available for the session file")]
    NoDataDir,
}

/// Configuration for the registry client
#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(default)]
pub struct ClientConfig {
    /// Base URL of the registry API, including the `/api` prefix
    pub api_base_url: String,

    /// Per-request timeout in seconds
    pub request_timeout_secs: u64,

    /// Where the session (token + user) is persisted
    pub session_file: Option<PathBuf>,

    /// Debounce window for the counterparty lookup
    pub user_search_debounce_ms: u64,

    /// Debounce window for the property search view
    pub property_search_debounce_ms: u64,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_base_url: DEFAULT_API_URL.to_string(),
            request_timeout_secs: 30,
            session_file: None,
            user_search_debounce_ms: 300,
            property_search_debounce_ms: 500,
        }
    }
}

impl ClientConfig {
    /// Load configuration from a YAML file
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = fs::read_to_string(path)?;
        let config: ClientConfig = serde_yaml::from_str(&contents)?;
        debug!("Loaded configuration from {}", path.display());
        Ok(config)
    }

    /// Load from an optional file, then let the environment override it
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let mut config = match path {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };
        config.apply_env(|key| std::env::var(key).ok())?;
        Ok(config)
    }

    /// Apply `LANDREG_*` overrides. The lookup is injected so tests do not
    /// have to touch the process environment.
    pub fn apply_env<F>(&mut self, lookup: F) -> Result<(), ConfigError>
        where F: Fn(&str) -> Option<String>
    {
        if let Some(url) = lookup("LANDREG_API_URL") {
            info!("Using API URL from environment");
            self.api_base_url = url;
        }
        if let Some(path) = lookup("LANDREG_SESSION_FILE") {
            self.session_file = Some(PathBuf::from(path));
        }
        if let Some(raw) = lookup("LANDREG_TIMEOUT_SECS") {
            self.request_timeout_secs = raw
                .trim()
                .parse()
                .map_err(|_| ConfigError::InvalidValue {
                    key: "LANDREG_TIMEOUT_SECS".to_string(),
                    value: raw.clone(),
                })?;
        }
        self.validate()
    }

    fn validate(&self) -> Result<(), ConfigError> {
        let url = self.api_base_url.trim();
        if !(url.starts_with("http://") || url.starts_with("https://")) {
            return Err(ConfigError::InvalidValue {
                key: "api_base_url".to_string(),
                value: self.api_base_url.clone(),
            });
        }
        if self.request_timeout_secs == 0 {
            return Err(ConfigError::InvalidValue {
                key: "request_timeout_secs".to_string(),
                value: "0".to_string(),
            });
        }
        Ok(())
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn user_search_debounce(&self) -> Duration {
        Duration::from_millis(self.user_search_debounce_ms)
    }

    pub fn property_search_debounce(&self) -> Duration {
        Duration::from_millis(self.property_search_debounce_ms)
    }

    /// The configured session file, or `session.json` in the platform data dir
    pub fn session_path(&self) -> Result<PathBuf, ConfigError> {
        if let Some(path) = &self.session_file {
            return Ok(path.clone());
        }
        let dirs = directories::ProjectDirs
            ::from("com", "landreg", "landreg")
            .ok_or(ConfigError::NoDataDir)?;
        Ok(dirs.data_dir().join("session.json"))
    }

    /// Join a path onto the API base URL
    pub fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.api_base_url.trim_end_matches('/'), path.trim_start_matches('/'))
    }
}
