//! Error types for the platform-access crate.
//!
//! - `IntrospectionError`: the identity provider could not describe a token
//! - `ValidationError`: a described token failed a verification rule
//! - `ClaimError`: claims could not be resolved for a call
//!
//! Access denial is not an error; it is a [`Decision`](warden_core::Decision).

use std::fmt;

/// Errors from introspecting a token at the identity provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IntrospectionError {
    /// The request could not be sent or no response arrived.
    Request { details: String },
    /// The provider answered with a non-200 status.
    Status { status: u16, reason: String },
    /// The response body was not a token description.
    Decode { details: String },
}

impl IntrospectionError {
    /// Returns true if the provider rejected the token itself.
    ///
    /// Token-info endpoints answer 4xx for unknown or revoked tokens.
    #[must_use]
    pub fn is_rejection(&self) -> bool {
        matches!(self, Self::Status { status, .. } if (400..500).contains(status))
    }
}

impl fmt::Display for IntrospectionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Request { details } => write!(f, "request failed: {details}"),
            Self::Status { status, reason } => write!(f, "request error: {status} {reason}"),
            Self::Decode { details } => write!(f, "invalid token info response: {details}"),
        }
    }
}

impl std::error::Error for IntrospectionError {}

/// A token verification rule that failed.
///
/// The display text of each variant is stable and user-visible.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// The expiry is not an integer.
    InvalidExpiry { details: String },
    /// The token was issued to a different OAuth client.
    IncorrectClientId,
    /// The token lacks the required scope.
    MissingScope,
    /// The token's email is not verified.
    EmailNotVerified,
    /// The token is past its expiry.
    Expired,
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidExpiry { details } => write!(f, "error validating token: {details}"),
            Self::IncorrectClientId => write!(f, "incorrect token client id"),
            Self::MissingScope => write!(f, "token scope must include email"),
            Self::EmailNotVerified => write!(f, "token email not verified"),
            Self::Expired => write!(f, "token expired"),
        }
    }
}

impl std::error::Error for ValidationError {}

/// Errors from resolving the claims of a call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClaimError {
    /// No authorization header value was supplied.
    NoAuthToken,
    /// The header is not `Bearer <token>`.
    InvalidTokenLength,
    /// The token could not be introspected.
    TokenInfo { source: IntrospectionError },
    /// The token failed verification.
    TokenValidation { source: ValidationError },
    /// Group memberships could not be read.
    GroupMembership { details: String },
    /// Namespace grants could not be read.
    NamespaceAccess { details: String },
}

impl ClaimError {
    /// Returns true if the caller's credential is at fault, as opposed to an
    /// unavailable identity provider or relationship store.
    #[must_use]
    pub fn is_credential_error(&self) -> bool {
        match self {
            Self::NoAuthToken | Self::InvalidTokenLength | Self::TokenValidation { .. } => true,
            Self::TokenInfo { source } => source.is_rejection(),
            Self::GroupMembership { .. } | Self::NamespaceAccess { .. } => false,
        }
    }
}

impl fmt::Display for ClaimError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NoAuthToken => write!(f, "no auth token provided"),
            Self::InvalidTokenLength => write!(f, "invalid token length"),
            Self::TokenInfo { source } => {
                write!(f, "error fetching access token info: {source}")
            }
            Self::TokenValidation { source } => {
                write!(f, "error validating access token: {source}")
            }
            Self::GroupMembership { details } => {
                write!(f, "error reading group membership: {details}")
            }
            Self::NamespaceAccess { details } => {
                write!(f, "error reading namespace access: {details}")
            }
        }
    }
}

impl std::error::Error for ClaimError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::TokenInfo { source } => Some(source),
            Self::TokenValidation { source } => Some(source),
            _ => None,
        }
    }
}
