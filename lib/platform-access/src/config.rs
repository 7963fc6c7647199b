//! Authentication and authorization configuration.
//!
//! This module provides the configuration consumed by the token verifier
//! and the claim mapper: where to introspect tokens, what a valid token must
//! carry, and which groups and namespaces receive blanket grants.

use serde::{Deserialize, Serialize};
use warden_authz::StoreConfig;

/// Configuration for the authorization pipeline.
///
/// Fields with defaults can be omitted when loading from environment variables.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    /// Whether calls are authorized at all. When false every call is allowed.
    /// Default: true
    #[serde(default = "default_enabled")]
    enabled: bool,
    /// Token-info endpoint of the identity provider.
    /// Default: "https://www.googleapis.com/oauth2/v3/tokeninfo"
    #[serde(default = "default_token_info_url")]
    token_info_url: String,
    /// Scope every token must include. Empty disables the check.
    /// Default: "https://www.googleapis.com/auth/userinfo.email"
    #[serde(default = "default_required_scope")]
    required_scope: String,
    /// OAuth client ID tokens must be issued to. Empty disables the check.
    #[serde(default)]
    client_id: String,
    /// Comma-separated groups whose members get system-wide write access.
    #[serde(default)]
    admin_groups: String,
    /// Comma-separated namespaces writable by every authenticated caller.
    #[serde(default)]
    open_access_namespaces: String,
    /// Relationship store holding group memberships and namespace grants.
    #[serde(default)]
    store: StoreConfig,
}

fn default_enabled() -> bool {
    true
}

fn default_token_info_url() -> String {
    "https://www.googleapis.com/oauth2/v3/tokeninfo".to_string()
}

fn default_required_scope() -> String {
    "https://www.googleapis.com/auth/userinfo.email".to_string()
}

/// Splits a comma-separated list, trimming entries and dropping empty ones.
pub(crate) fn split_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|entry| !entry.is_empty())
        .map(str::to_string)
        .collect()
}

impl AuthConfig {
    /// Creates a configuration with defaults for every field except the store.
    #[must_use]
    pub fn new(store: StoreConfig) -> Self {
        Self {
            enabled: default_enabled(),
            token_info_url: default_token_info_url(),
            required_scope: default_required_scope(),
            client_id: String::new(),
            admin_groups: String::new(),
            open_access_namespaces: String::new(),
            store,
        }
    }

    /// Creates a configuration builder for more customization.
    #[must_use]
    pub fn builder(store: StoreConfig) -> AuthConfigBuilder {
        AuthConfigBuilder::new(store)
    }

    /// Returns whether authorization is enforced.
    #[must_use]
    pub fn enabled(&self) -> bool {
        self.enabled
    }

    /// Returns the token-info endpoint URL.
    #[must_use]
    pub fn token_info_url(&self) -> &str {
        &self.token_info_url
    }

    /// Returns the required scope.
    #[must_use]
    pub fn required_scope(&self) -> &str {
        &self.required_scope
    }

    /// Returns the expected OAuth client ID.
    #[must_use]
    pub fn client_id(&self) -> &str {
        &self.client_id
    }

    /// Returns the admin groups, parsed from the comma-separated string.
    #[must_use]
    pub fn admin_groups(&self) -> Vec<String> {
        split_list(&self.admin_groups)
    }

    /// Returns the open-access namespaces, parsed from the comma-separated string.
    #[must_use]
    pub fn open_access_namespaces(&self) -> Vec<String> {
        split_list(&self.open_access_namespaces)
    }

    /// Returns the relationship store configuration.
    #[must_use]
    pub fn store(&self) -> &StoreConfig {
        &self.store
    }
}

/// Builder for `AuthConfig`.
#[derive(Debug)]
pub struct AuthConfigBuilder {
    config: AuthConfig,
}

impl AuthConfigBuilder {
    /// Creates a new builder with defaults.
    #[must_use]
    pub fn new(store: StoreConfig) -> Self {
        Self {
            config: AuthConfig::new(store),
        }
    }

    /// Enables or disables enforcement.
    #[must_use]
    pub fn enabled(mut self, enabled: bool) -> Self {
        self.config.enabled = enabled;
        self
    }

    /// Sets the token-info endpoint URL.
    #[must_use]
    pub fn token_info_url(mut self, url: String) -> Self {
        self.config.token_info_url = url;
        self
    }

    /// Sets the required scope.
    #[must_use]
    pub fn required_scope(mut self, scope: String) -> Self {
        self.config.required_scope = scope;
        self
    }

    /// Sets the expected OAuth client ID.
    #[must_use]
    pub fn client_id(mut self, client_id: String) -> Self {
        self.config.client_id = client_id;
        self
    }

    /// Sets the admin groups.
    #[must_use]
    pub fn admin_groups(mut self, groups: &[&str]) -> Self {
        self.config.admin_groups = groups.join(",");
        self
    }

    /// Sets the open-access namespaces.
    #[must_use]
    pub fn open_access_namespaces(mut self, namespaces: &[&str]) -> Self {
        self.config.open_access_namespaces = namespaces.join(",");
        self
    }

    /// Builds the `AuthConfig`.
    #[must_use]
    pub fn build(self) -> AuthConfig {
        self.config
    }
}
