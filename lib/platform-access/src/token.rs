//! Bearer token introspection and verification.
//!
//! Tokens are opaque to warden. Their meaning comes from the identity
//! provider's token-info endpoint, which describes the token as a
//! [`TokenInfo`]; [`TokenVerifier::verify_token`] then decides whether that
//! description is acceptable.

use crate::config::AuthConfig;
use crate::error::{IntrospectionError, ValidationError};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use tracing::{debug, instrument};

/// Email suffix of provisioned service accounts, which are exempt from the
/// client ID check.
pub const SERVICE_ACCOUNT_SUFFIX: &str = ".iam.gserviceaccount.com";

/// Description of an access token as returned by the token-info endpoint.
///
/// Every field is a string; missing fields are empty.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TokenInfo {
    /// Authorized party: the OAuth client the token was issued to.
    pub azp: String,
    /// Audience.
    pub aud: String,
    /// Subject identifier.
    pub sub: String,
    /// Space-delimited granted scopes.
    pub scope: String,
    /// Expiry in epoch seconds.
    #[serde(deserialize_with = "string_or_number")]
    pub exp: String,
    /// Seconds until expiry at introspection time.
    #[serde(deserialize_with = "string_or_number")]
    pub expires_in: String,
    /// Email of the subject.
    pub email: String,
    /// `"true"` when the email is verified.
    pub email_verified: String,
    /// "online" or "offline".
    pub access_type: String,
}

/// Accepts both `"3600"` and `3600`; some providers emit numbers.
fn string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Text(String),
        Number(i64),
    }

    Ok(match Raw::deserialize(deserializer)? {
        Raw::Text(text) => text,
        Raw::Number(number) => number.to_string(),
    })
}

/// Fetches and verifies token descriptions.
#[async_trait]
pub trait TokenVerifier: Send + Sync {
    /// Introspects an access token. One round trip, no retries.
    async fn get_token_info(&self, access_token: &str) -> Result<TokenInfo, IntrospectionError>;

    /// Checks a token description, returning the first rule it fails.
    fn verify_token(&self, token: &TokenInfo) -> Result<(), ValidationError>;
}

/// [`TokenVerifier`] backed by an HTTP token-info endpoint.
#[derive(Debug, Clone)]
pub struct TokenInfoVerifier {
    http: reqwest::Client,
    client_id: String,
    token_info_url: String,
    required_scope: String,
}

impl TokenInfoVerifier {
    /// Creates a verifier.
    ///
    /// An empty `client_id` or `required_scope` disables that check.
    pub fn new(
        client_id: impl Into<String>,
        token_info_url: impl Into<String>,
        required_scope: impl Into<String>,
    ) -> Result<Self, IntrospectionError> {
        let http = reqwest::Client::builder()
            .build()
            .map_err(|e| IntrospectionError::Request {
                details: format!("failed to create HTTP client: {e}"),
            })?;

        Ok(Self {
            http,
            client_id: client_id.into(),
            token_info_url: token_info_url.into(),
            required_scope: required_scope.into(),
        })
    }

    /// Creates a verifier from the auth configuration.
    pub fn from_config(config: &AuthConfig) -> Result<Self, IntrospectionError> {
        Self::new(
            config.client_id(),
            config.token_info_url(),
            config.required_scope(),
        )
    }

    /// Checks `token` as of `now`.
    ///
    /// Rules are applied in a fixed order and the first failure is returned.
    pub fn verify_token_at(
        &self,
        token: &TokenInfo,
        now: DateTime<Utc>,
    ) -> Result<(), ValidationError> {
        let exp = token
            .exp
            .parse::<i64>()
            .map_err(|e| ValidationError::InvalidExpiry {
                details: e.to_string(),
            })?;

        if !token.email.ends_with(SERVICE_ACCOUNT_SUFFIX)
            && !self.client_id.is_empty()
            && token.azp != self.client_id
        {
            return Err(ValidationError::IncorrectClientId);
        }

        if !self.required_scope.is_empty() && !token.scope.contains(&self.required_scope) {
            return Err(ValidationError::MissingScope);
        }

        if token.email_verified != "true" {
            return Err(ValidationError::EmailNotVerified);
        }

        let expired = match DateTime::<Utc>::from_timestamp(exp, 0) {
            Some(expires_at) => now > expires_at,
            None => exp < 0,
        };
        if expired {
            return Err(ValidationError::Expired);
        }

        Ok(())
    }
}

#[async_trait]
impl TokenVerifier for TokenInfoVerifier {
    #[instrument(skip_all)]
    async fn get_token_info(&self, access_token: &str) -> Result<TokenInfo, IntrospectionError> {
        let response = self
            .http
            .get(&self.token_info_url)
            .bearer_auth(access_token)
            .send()
            .await
            .map_err(|e| IntrospectionError::Request {
                details: e.to_string(),
            })?;

        let status = response.status();
        if status != reqwest::StatusCode::OK {
            return Err(IntrospectionError::Status {
                status: status.as_u16(),
                reason: status.canonical_reason().unwrap_or_default().to_string(),
            });
        }

        let info: TokenInfo = response
            .json()
            .await
            .map_err(|e| IntrospectionError::Decode {
                details: e.to_string(),
            })?;

        debug!(azp = %info.azp, "token introspected");
        Ok(info)
    }

    fn verify_token(&self, token: &TokenInfo) -> Result<(), ValidationError> {
        self.verify_token_at(token, Utc::now())
    }
}
