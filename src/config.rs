//! Process configuration for the Sky-Scrapper API.
//!
//! All three settings are read once at startup and handed to
//! [`crate::SkyClient`] by value; nothing else in the crate touches the
//! environment.

use std::env;
use thiserror::Error;

/// Environment variable holding the API base URL.
pub const ENV_API_URL: &str = "SKYSCOUT_API_URL";
/// Environment variable holding the RapidAPI host header value.
pub const ENV_API_HOST: &str = "SKYSCOUT_API_HOST";
/// Environment variable holding the RapidAPI key.
pub const ENV_API_KEY: &str = "SKYSCOUT_API_KEY";

/// Error types for configuration loading
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("missing or empty environment variable: {0}")]
    MissingVar(&'static str),
}

/// Connection settings for the Sky-Scrapper API.
#[derive(Debug, Clone)]
pub struct ApiConfig {
    /// Base URL without a trailing slash, e.g. `https://sky-scrapper.p.rapidapi.com/api`.
    pub base_url: String,
    /// Value for the `x-rapidapi-host` header.
    pub api_host: String,
    /// Value for the `x-rapidapi-key` header.
    pub api_key: String,
}

impl ApiConfig {
    /// Read the configuration from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Build a configuration for a known endpoint, bypassing the environment.
    pub fn new(
        base_url: impl Into<String>,
        api_host: impl Into<String>,
        api_key: impl Into<String>,
    ) -> Self {
        Self {
            base_url: base_url.into(),
            api_host: api_host.into(),
            api_key: api_key.into(),
        }
    }

    fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&'static str) -> Option<String>,
    {
        Ok(Self {
            base_url: require(&lookup, ENV_API_URL)?,
            api_host: require(&lookup, ENV_API_HOST)?,
            api_key: require(&lookup, ENV_API_KEY)?,
        })
    }
}

fn require<F>(lookup: &F, name: &'static str) -> Result<String, ConfigError>
where
    F: Fn(&'static str) -> Option<String>,
{
    match lookup(name) {
        Some(value) if !value.trim().is_empty() => Ok(value),
        _ => Err(ConfigError::MissingVar(name)),
    }
}
