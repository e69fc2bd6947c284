use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::SpotlinkError;

pub const DEFAULT_AUTHORIZATION_ENDPOINT: &str = "https://accounts.spotify.com/authorize";
pub const DEFAULT_TOKEN_ENDPOINT: &str = "https://accounts.spotify.com/api/token";
pub const DEFAULT_API_BASE_URL: &str = "https://api.spotify.com/v1";
pub const DEFAULT_REDIRECT_URI: &str = "http://127.0.0.1:8888/callback";
pub const DEFAULT_REDIRECT_TIMEOUT_MS: u64 = 120_000;

/// Scopes covering every endpoint wrapper in [`crate::api`].
pub const DEFAULT_SCOPES: &[&str] = &[
    "user-read-private",
    "user-read-email",
    "user-top-read",
    "user-library-read",
    "user-follow-read",
    "user-modify-playback-state",
];

/// Static OAuth and API configuration supplied by the embedding application.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthConfig {
    #[serde(default)]
    pub client_id: String,
    #[serde(default = "default_scopes")]
    pub scopes: Vec<String>,
    #[serde(default = "default_authorization_endpoint")]
    pub authorization_endpoint: String,
    #[serde(default = "default_token_endpoint")]
    pub token_endpoint: String,
    #[serde(default = "default_redirect_uri")]
    pub redirect_uri: String,
    #[serde(default = "default_api_base_url")]
    pub api_base_url: String,
    #[serde(default = "default_redirect_timeout_ms")]
    pub redirect_timeout_ms: u64,
}

fn default_scopes() -> Vec<String> {
    DEFAULT_SCOPES.iter().map(|s| s.to_string()).collect()
}

fn default_authorization_endpoint() -> String {
    DEFAULT_AUTHORIZATION_ENDPOINT.to_string()
}

fn default_token_endpoint() -> String {
    DEFAULT_TOKEN_ENDPOINT.to_string()
}

fn default_redirect_uri() -> String {
    DEFAULT_REDIRECT_URI.to_string()
}

fn default_api_base_url() -> String {
    DEFAULT_API_BASE_URL.to_string()
}

fn default_redirect_timeout_ms() -> u64 {
    DEFAULT_REDIRECT_TIMEOUT_MS
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            client_id: String::new(),
            scopes: default_scopes(),
            authorization_endpoint: default_authorization_endpoint(),
            token_endpoint: default_token_endpoint(),
            redirect_uri: default_redirect_uri(),
            api_base_url: default_api_base_url(),
            redirect_timeout_ms: default_redirect_timeout_ms(),
        }
    }
}

impl AuthConfig {
    pub fn new(client_id: impl Into<String>) -> Self {
        Self {
            client_id: client_id.into(),
            ..Self::default()
        }
    }

    pub fn redirect_timeout(&self) -> Duration {
        Duration::from_millis(self.redirect_timeout_ms)
    }

    /// Check that the client id is set and every URL field parses.
    pub fn validate(&self) -> Result<(), SpotlinkError> {
        if self.client_id.trim().is_empty() {
            return Err(SpotlinkError::InvalidConfig(
                "clientId is empty; set it in the config file or SPOTIFY_CLIENT_ID".to_string(),
            ));
        }
        for (field, value) in [
            ("authorizationEndpoint", &self.authorization_endpoint),
            ("tokenEndpoint", &self.token_endpoint),
            ("redirectUri", &self.redirect_uri),
            ("apiBaseUrl", &self.api_base_url),
        ] {
            reqwest::Url::parse(value).map_err(|e| {
                SpotlinkError::InvalidConfig(format!("{field} '{value}' is not a valid URL: {e}"))
            })?;
        }
        if self.redirect_timeout_ms == 0 {
            return Err(SpotlinkError::InvalidConfig(
                "redirectTimeoutMs must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }
}
