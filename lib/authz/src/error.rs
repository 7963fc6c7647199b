//! Authorization store error types.

use std::fmt;

/// Relationship-store errors.
#[derive(Debug)]
pub enum AuthzError {
    /// Failed to connect to the relationship store.
    ConnectionFailed {
        /// Error details.
        details: String,
    },
    /// A store request failed in transit or was rejected.
    RequestFailed {
        /// Error details.
        details: String,
    },
    /// The store answered with a non-success status.
    UnexpectedStatus {
        /// HTTP status code.
        status: u16,
        /// Response body or reason phrase.
        message: String,
    },
    /// The store response could not be interpreted.
    MalformedResponse {
        /// Error details.
        details: String,
    },
    /// Invalid pattern or configuration.
    InvalidInput {
        /// Error details.
        details: String,
    },
}

impl fmt::Display for AuthzError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ConnectionFailed { details } => {
                write!(f, "failed to connect to relationship store: {}", details)
            }
            Self::RequestFailed { details } => {
                write!(f, "relationship store request failed: {}", details)
            }
            Self::UnexpectedStatus { status, message } => {
                write!(
                    f,
                    "relationship store returned status {}: {}",
                    status, message
                )
            }
            Self::MalformedResponse { details } => {
                write!(f, "malformed relationship store response: {}", details)
            }
            Self::InvalidInput { details } => {
                write!(f, "invalid relationship store input: {}", details)
            }
        }
    }
}

impl std::error::Error for AuthzError {}
