//! Connection settings for the remote procedural API.
//!
//! Values are consumed as already-resolved strings; nothing here talks to
//! the endpoint. They are read from the environment:
//!
//! ```text
//! MP_WSDL           absolute URL of the API endpoint
//! MP_DOMAIN_GUID    domain GUID of the installation
//! MP_API_PASSWORD   API password
//! MP_SERVER_NAME    server host name, without protocol
//! ```
//!
//! or from a JSON file with the same fields in snake_case.

use std::fmt;
use std::path::Path;

use serde::Deserialize;
use thiserror::Error;

pub const ENV_ENDPOINT: &str = "MP_WSDL";
pub const ENV_DOMAIN_GUID: &str = "MP_DOMAIN_GUID";
pub const ENV_API_PASSWORD: &str = "MP_API_PASSWORD";
pub const ENV_SERVER_NAME: &str = "MP_SERVER_NAME";

#[derive(Debug, Error)]
pub enum ConfigError {
    /// A required environment variable is unset or empty.
    #[error("Missing configuration value: {0}")]
    Missing(&'static str),

    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid config file: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Credentials and addressing for one installation.
#[derive(Clone, PartialEq, Eq, Deserialize)]
pub struct ConnectionConfig {
    pub endpoint: String,
    pub domain_guid: String,
    pub api_password: String,
    pub server_name: String,
}

impl ConnectionConfig {
    /// Load from the `MP_*` environment variables.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Missing` naming the first absent variable.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load from any key lookup; used by `from_env` and tests.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let require = |key: &'static str| {
            lookup(key)
                .filter(|v| !v.trim().is_empty())
                .ok_or(ConfigError::Missing(key))
        };

        Ok(Self {
            endpoint: require(ENV_ENDPOINT)?,
            domain_guid: require(ENV_DOMAIN_GUID)?,
            api_password: require(ENV_API_PASSWORD)?,
            server_name: require(ENV_SERVER_NAME)?,
        })
    }

    /// Load from a JSON file.
    pub fn from_json_file(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&text)?)
    }
}

impl fmt::Debug for ConnectionConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConnectionConfig")
            .field("endpoint", &self.endpoint)
            .field("domain_guid", &self.domain_guid)
            .field("api_password", &"<redacted>")
            .field("server_name", &self.server_name)
            .finish()
    }
}
