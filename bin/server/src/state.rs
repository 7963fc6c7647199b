//! Shared application state.

use crate::error::AuthorizeError;
use std::time::Duration;
use warden_core::{CallTarget, Decision};
use warden_platform_access::{Authorizer, TokenClaimMapper};

/// State shared by every request.
///
/// Immutable after construction; the mapper holds the shared store handle.
#[derive(Clone)]
pub struct AppState {
    /// `None` when authorization is disabled.
    mapper: Option<TokenClaimMapper>,
    authorizer: Authorizer,
    timeout: Duration,
}

impl AppState {
    /// Creates state that resolves claims for every call.
    #[must_use]
    pub fn enforcing(mapper: TokenClaimMapper, timeout: Duration) -> Self {
        Self {
            mapper: Some(mapper),
            authorizer: Authorizer::new(),
            timeout,
        }
    }

    /// Creates state that allows every call without looking at credentials.
    #[must_use]
    pub fn allow_all() -> Self {
        Self {
            mapper: None,
            authorizer: Authorizer::new(),
            timeout: Duration::ZERO,
        }
    }

    /// Resolves claims for `auth_header` and decides `target`.
    ///
    /// # Errors
    ///
    /// Returns an error if claims cannot be resolved within the deadline.
    pub async fn decide(
        &self,
        auth_header: &str,
        target: &CallTarget,
    ) -> Result<Decision, AuthorizeError> {
        let Some(mapper) = &self.mapper else {
            return Ok(Decision::Allow);
        };

        let claims = tokio::time::timeout(self.timeout, mapper.get_claims(auth_header))
            .await
            .map_err(|_| AuthorizeError::DeadlineExceeded {
                timeout_ms: self.timeout.as_millis(),
            })??;

        Ok(self.authorizer.authorize(Some(&claims), target))
    }
}
