//! Centralized server configuration.
//!
//! This module provides strongly-typed configuration for the server,
//! loaded via the `config` crate from environment variables.
//!
//! See [`AuthConfig`](warden_platform_access::AuthConfig) for token
//! verification and relationship store configuration.

use serde::Deserialize;
use std::time::Duration;
use warden_authz::StoreConfig;
use warden_platform_access::AuthConfig;

/// Server configuration composed from library configs.
#[derive(Debug, Deserialize)]
pub struct ServerConfig {
    /// Address the HTTP listener binds to.
    #[serde(default = "default_listen_addr")]
    pub listen_addr: String,

    /// Upper bound on claim resolution plus the decision, in milliseconds.
    #[serde(default = "default_authorization_timeout_ms")]
    pub authorization_timeout_ms: u64,

    /// Authorization pipeline configuration.
    #[serde(default = "default_auth")]
    pub auth: AuthConfig,
}

fn default_listen_addr() -> String {
    "0.0.0.0:8080".to_string()
}

fn default_authorization_timeout_ms() -> u64 {
    5000
}

fn default_auth() -> AuthConfig {
    AuthConfig::new(StoreConfig::default())
}

impl ServerConfig {
    /// Loads configuration from environment variables.
    ///
    /// Nested keys use `__`, e.g. `AUTH__CLIENT_ID` or
    /// `AUTH__STORE__OPENFGA__API_HOST`.
    ///
    /// # Errors
    ///
    /// Returns an error if required configuration is missing or invalid.
    pub fn from_env() -> Result<Self, config::ConfigError> {
        config::Config::builder()
            .add_source(
                config::Environment::default()
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?
            .try_deserialize()
    }

    /// Returns the authorization deadline.
    #[must_use]
    pub fn authorization_timeout(&self) -> Duration {
        Duration::from_millis(self.authorization_timeout_ms)
    }
}
