//! Client configuration parsed from environment variables.

pub const DEFAULT_API_URL: &str = "http://127.0.0.1:3333";
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 10;

/// Errors produced while reading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// The API URL is not an http(s) URL.
    #[error("invalid GODBOARD_API_URL: {0}")]
    InvalidApiUrl(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timeouts {
    pub request_secs: u64,
    pub connect_secs: u64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Platform API base URL, without a trailing slash.
    pub api_url: String,
    /// Bearer token from a previous login, if any.
    pub token: Option<String>,
    pub timeouts: Timeouts,
}

impl Config {
    /// Build typed config from environment variables.
    ///
    /// Optional:
    /// - `GODBOARD_API_URL`: default `http://127.0.0.1:3333`
    /// - `GODBOARD_TOKEN`: bearer token
    /// - `GODBOARD_REQUEST_TIMEOUT_SECS`: default 30
    /// - `GODBOARD_CONNECT_TIMEOUT_SECS`: default 10
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidApiUrl`] if the URL is not http(s).
    pub fn from_env() -> Result<Self, ConfigError> {
        let api_url = std::env::var("GODBOARD_API_URL").unwrap_or_else(|_| DEFAULT_API_URL.to_string());
        let token = std::env::var("GODBOARD_TOKEN").ok().filter(|t| !t.trim().is_empty());
        let timeouts = Timeouts {
            request_secs: env_parse_u64("GODBOARD_REQUEST_TIMEOUT_SECS", DEFAULT_REQUEST_TIMEOUT_SECS),
            connect_secs: env_parse_u64("GODBOARD_CONNECT_TIMEOUT_SECS", DEFAULT_CONNECT_TIMEOUT_SECS),
        };
        Self::new(&api_url, token, timeouts)
    }

    /// Build config from explicit values.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidApiUrl`] if the URL is not http(s).
    pub fn new(api_url: &str, token: Option<String>, timeouts: Timeouts) -> Result<Self, ConfigError> {
        let api_url = normalize_api_url(api_url)?;
        Ok(Self { api_url, token, timeouts })
    }
}

impl Default for Timeouts {
    fn default() -> Self {
        Self { request_secs: DEFAULT_REQUEST_TIMEOUT_SECS, connect_secs: DEFAULT_CONNECT_TIMEOUT_SECS }
    }
}

fn normalize_api_url(raw: &str) -> Result<String, ConfigError> {
    let trimmed = raw.trim().trim_end_matches('/');
    if !(trimmed.starts_with("http://") || trimmed.starts_with("https://")) {
        return Err(ConfigError::InvalidApiUrl(raw.to_string()));
    }
    Ok(trimmed.to_string())
}

fn env_parse_u64(key: &str, default: u64) -> u64 {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse::<u64>().ok())
        .filter(|v| *v > 0)
        .unwrap_or(default)
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
