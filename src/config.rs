//! Client configuration loaded from an explicit struct, the environment, or
//! a `rundeck.toml` file.
//!
//! Values missing from the file use sensible defaults. The `RUNDECK_*`
//! environment variables take precedence over the file.

use std::fmt;
use std::path::Path;

use serde::Deserialize;

use crate::error::{Result, RundeckError};

/// API version used when none is configured.
pub const DEFAULT_API_VERSION: u32 = 24;

/// Server address used when none is configured.
pub const DEFAULT_SERVER_URL: &str = "http://localhost:4440";

/// Environment variable holding the auth token.
pub const ENV_TOKEN: &str = "RUNDECK_TOKEN";

/// Environment variable holding the server URL.
pub const ENV_SERVER_URL: &str = "RUNDECK_SERVER_URL";

/// Environment variable holding the API version.
pub const ENV_API_VERSION: &str = "RUNDECK_API_VERSION";

/// Configuration file looked up by [`Config::load`].
pub const CONFIG_FILE: &str = "rundeck.toml";

/// What the client needs to talk to a Rundeck server.
#[derive(Clone, PartialEq, Eq, Deserialize)]
pub struct Config {
    /// Server address, e.g. `http://localhost:4440` or `https://rundeck.example.com`.
    #[serde(default = "default_server_url")]
    pub server_url: String,

    /// API version to speak.
    #[serde(default = "default_api_version")]
    pub api_version: u32,

    /// Token sent in the `X-Rundeck-Auth-Token` header.
    #[serde(default)]
    pub auth_token: String,
}

fn default_server_url() -> String {
    DEFAULT_SERVER_URL.to_string()
}

fn default_api_version() -> u32 {
    DEFAULT_API_VERSION
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server_url: default_server_url(),
            api_version: default_api_version(),
            auth_token: String::new(),
        }
    }
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let token = if self.auth_token.is_empty() { "" } else { "<redacted>" };
        f.debug_struct("Config")
            .field("server_url", &self.server_url)
            .field("api_version", &self.api_version)
            .field("auth_token", &token)
            .finish()
    }
}

impl Config {
    pub fn new(
        server_url: impl Into<String>,
        api_version: u32,
        auth_token: impl Into<String>,
    ) -> Self {
        Self {
            server_url: server_url.into(),
            api_version,
            auth_token: auth_token.into(),
        }
    }

    /// Defaults overridden by the `RUNDECK_*` environment variables.
    ///
    /// Fails if `RUNDECK_API_VERSION` is set but not a number.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub(crate) fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();
        config.apply_env(lookup)?;
        Ok(config)
    }

    /// Loads `rundeck.toml` from the working directory, or the defaults if the
    /// file does not exist, then applies the environment.
    pub fn load() -> Result<Self> {
        let path = Path::new(CONFIG_FILE);
        if path.exists() {
            Self::load_from(path)
        } else {
            Self::from_env()
        }
    }

    /// Loads the given TOML file, then applies the environment.
    pub fn load_from(path: impl AsRef<Path>) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        let mut config = toml::from_str::<Config>(&contents)?;
        config.apply_env(|key| std::env::var(key).ok())?;
        Ok(config)
    }

    /// Overrides fields from a variable lookup. Empty values are skipped.
    pub(crate) fn apply_env<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(url) = lookup(ENV_SERVER_URL)
            && !url.is_empty()
        {
            self.server_url = url;
        }

        if let Some(token) = lookup(ENV_TOKEN)
            && !token.is_empty()
        {
            self.auth_token = token;
        }

        if let Some(version) = lookup(ENV_API_VERSION)
            && !version.is_empty()
        {
            self.api_version = version.trim().parse().map_err(|_| {
                RundeckError::Config(format!("{ENV_API_VERSION} is not a number: {version}"))
            })?;
        }

        Ok(())
    }
}
