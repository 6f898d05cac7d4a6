//! Configuration for the Fabraic client.

use std::fmt;
use std::path::Path;

use serde::Deserialize;

use crate::error::{FabraicError, FabraicResult};

/// Environment variable holding the API key.
pub const ENV_API_KEY: &str = "FABRAIC_API_KEY";

/// Environment variable holding the OAuth access token.
pub const ENV_ACCESS_TOKEN: &str = "FABRAIC_ACCESS_TOKEN";

/// Environment variable overriding the base URL.
pub const ENV_BASE_URL: &str = "FABRAIC_BASE_URL";

/// Inputs supplied once when building a [`FabraicClient`](crate::FabraicClient).
///
/// At least one of `api_key` / `access_token` must be set. When both are
/// present the access token wins. Empty strings count as absent.
#[derive(Clone, Default, Deserialize)]
pub struct ClientConfig {
    /// API key, sent as `x-api-key`.
    #[serde(default)]
    pub api_key: Option<String>,

    /// Access token, sent as `Authorization: Bearer <token>`.
    #[serde(default)]
    pub access_token: Option<String>,

    /// Base endpoint. Defaults to [`DEFAULT_BASE_URL`](crate::DEFAULT_BASE_URL).
    #[serde(default)]
    pub base_url: Option<String>,

    /// Transport override. Timeouts, proxies and TLS belong to this client.
    #[serde(skip)]
    pub http_client: Option<reqwest::Client>,
}

impl ClientConfig {
    /// Create an empty configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create from environment variables.
    ///
    /// Reads `FABRAIC_API_KEY`, `FABRAIC_ACCESS_TOKEN`, `FABRAIC_BASE_URL`.
    pub fn from_env() -> Self {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Build from a variable lookup keyed by the `FABRAIC_*` names.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        Self {
            api_key: lookup(ENV_API_KEY),
            access_token: lookup(ENV_ACCESS_TOKEN),
            base_url: lookup(ENV_BASE_URL),
            http_client: None,
        }
    }

    /// Parse a TOML document with `api_key`, `access_token` and `base_url` keys.
    pub fn from_toml_str(raw: &str) -> FabraicResult<Self> {
        toml::from_str(raw).map_err(|e| FabraicError::Config(format!("invalid config: {e}")))
    }

    /// Load a TOML configuration file.
    pub fn from_file(path: impl AsRef<Path>) -> FabraicResult<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path)
            .map_err(|e| FabraicError::Config(format!("cannot read {}: {e}", path.display())))?;
        Self::from_toml_str(&raw)
    }

    /// Set API key.
    pub fn with_api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = Some(key.into());
        self
    }

    /// Set access token.
    pub fn with_access_token(mut self, token: impl Into<String>) -> Self {
        self.access_token = Some(token.into());
        self
    }

    /// Set the base endpoint.
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = Some(url.into());
        self
    }

    /// Use a caller-built HTTP client as the transport.
    pub fn with_http_client(mut self, http: reqwest::Client) -> Self {
        self.http_client = Some(http);
        self
    }

    /// Non-empty API key, if any.
    pub(crate) fn api_key(&self) -> Option<&str> {
        self.api_key.as_deref().filter(|k| !k.is_empty())
    }

    /// Non-empty access token, if any.
    pub(crate) fn access_token(&self) -> Option<&str> {
        self.access_token.as_deref().filter(|t| !t.is_empty())
    }
}

impl fmt::Debug for ClientConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientConfig")
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("access_token", &self.access_token.as_ref().map(|_| "<redacted>"))
            .field("base_url", &self.base_url)
            .field("http_client", &self.http_client)
            .finish()
    }
}
