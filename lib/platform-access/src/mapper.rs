//! Claim resolution: from an `Authorization` header value to [`Claims`].
//!
//! The caller's token is introspected and verified, its email is looked up
//! in the relationship graph, and the groups found there determine the
//! caller's roles:
//!
//! - membership in an admin group grants `Writer` system-wide
//! - a group related to a namespace as `reader`, `writer` or `admin` grants
//!   that role on the namespace
//! - open-access namespaces are writable by every authenticated caller
//! - anyone with a namespace grant can read the global namespace `""`,
//!   which SDKs need for their initial discovery calls

use crate::config::{AuthConfig, split_list};
use crate::error::ClaimError;
use crate::token::TokenVerifier;
use std::sync::Arc;
use tracing::{debug, warn};
use warden_authz::NamespaceAccessProvider;
use warden_core::{Claims, Role};

const BEARER_PREFIX: &str = "Bearer ";

/// Group and namespace lists applied during claim resolution.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClaimMapperConfig {
    admin_groups: Vec<String>,
    open_access_namespaces: Vec<String>,
}

impl ClaimMapperConfig {
    /// Creates a configuration from explicit lists.
    #[must_use]
    pub fn new(admin_groups: Vec<String>, open_access_namespaces: Vec<String>) -> Self {
        Self {
            admin_groups,
            open_access_namespaces,
        }
    }

    /// Creates a configuration from comma-separated lists.
    #[must_use]
    pub fn from_lists(admin_groups: &str, open_access_namespaces: &str) -> Self {
        Self::new(split_list(admin_groups), split_list(open_access_namespaces))
    }
}

impl From<&AuthConfig> for ClaimMapperConfig {
    fn from(config: &AuthConfig) -> Self {
        Self::new(config.admin_groups(), config.open_access_namespaces())
    }
}

/// Resolves the claims of a caller from its bearer token.
///
/// Holds no per-call state; one mapper serves all concurrent calls.
#[derive(Clone)]
pub struct TokenClaimMapper {
    verifier: Arc<dyn TokenVerifier>,
    access: Arc<dyn NamespaceAccessProvider>,
    config: ClaimMapperConfig,
}

impl TokenClaimMapper {
    /// Creates a new claim mapper.
    #[must_use]
    pub fn new(
        verifier: Arc<dyn TokenVerifier>,
        access: Arc<dyn NamespaceAccessProvider>,
        config: ClaimMapperConfig,
    ) -> Self {
        Self {
            verifier,
            access,
            config,
        }
    }

    /// Resolves claims for an `Authorization` header value of the form
    /// `Bearer <token>`.
    ///
    /// A caller with no grants at all gets empty claims, not an error;
    /// every access decision on them denies.
    ///
    /// # Errors
    ///
    /// Returns an error if the header is malformed, the token cannot be
    /// introspected or fails verification, or the relationship store fails.
    pub async fn get_claims(&self, auth_header: &str) -> Result<Claims, ClaimError> {
        if auth_header.is_empty() {
            return Err(ClaimError::NoAuthToken);
        }
        let token = match auth_header.strip_prefix(BEARER_PREFIX) {
            Some(token) if !token.is_empty() => token,
            _ => return Err(ClaimError::InvalidTokenLength),
        };

        let token_info = self
            .verifier
            .get_token_info(token)
            .await
            .map_err(|source| log_error(ClaimError::TokenInfo { source }))?;
        self.verifier
            .verify_token(&token_info)
            .map_err(|source| log_error(ClaimError::TokenValidation { source }))?;

        let email = token_info.email.as_str();

        let groups = self.access.get_user_groups(email).await.map_err(|e| {
            log_error(ClaimError::GroupMembership {
                details: e.to_string(),
            })
        })?;

        if let Some(group) = self
            .config
            .admin_groups
            .iter()
            .find(|admin| groups.contains(admin))
        {
            debug!(email, group = %group, "caller is a system admin");
            return Ok(Claims::system(Role::Writer));
        }

        let access = self
            .access
            .get_namespace_access_information(email, &groups)
            .await
            .map_err(|e| {
                log_error(ClaimError::NamespaceAccess {
                    details: e.to_string(),
                })
            })?;

        let mut claims = Claims::none();
        for namespace in &self.config.open_access_namespaces {
            claims.namespaces.insert(namespace.clone(), Role::Writer);
        }

        // Later grants overwrite earlier ones for the same namespace,
        // including open-access grants.
        let mut has_namespaces = false;
        for grant in access {
            if grant.namespace.is_empty() {
                continue;
            }
            if let Some(role) = Role::from_relation(&grant.relation) {
                claims.namespaces.insert(grant.namespace, role);
                has_namespaces = true;
            }
        }

        if !claims.namespaces.is_empty() {
            claims.namespaces.insert(String::new(), Role::Reader);
        }

        if !has_namespaces {
            warn!(
                email,
                groups = ?groups,
                "received request with valid token but no namespace access"
            );
        }

        Ok(claims)
    }
}

fn log_error(err: ClaimError) -> ClaimError {
    warn!(error = %err, "failed to resolve claims");
    err
}
