//! Error types for the authorization endpoint and server startup.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use std::fmt;
use warden_platform_access::ClaimError;

/// Failure to reach a decision for one call.
#[derive(Debug)]
pub enum AuthorizeError {
    /// Claims could not be resolved.
    Claims(ClaimError),
    /// Claim resolution did not finish within the deadline.
    DeadlineExceeded { timeout_ms: u128 },
}

impl fmt::Display for AuthorizeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Claims(err) => write!(f, "{err}"),
            Self::DeadlineExceeded { timeout_ms } => {
                write!(f, "authorization did not complete within {timeout_ms}ms")
            }
        }
    }
}

impl std::error::Error for AuthorizeError {}

impl From<ClaimError> for AuthorizeError {
    fn from(err: ClaimError) -> Self {
        Self::Claims(err)
    }
}

impl IntoResponse for AuthorizeError {
    fn into_response(self) -> Response {
        let status = match &self {
            Self::Claims(err) if err.is_credential_error() => StatusCode::UNAUTHORIZED,
            Self::Claims(_) => StatusCode::SERVICE_UNAVAILABLE,
            Self::DeadlineExceeded { .. } => StatusCode::GATEWAY_TIMEOUT,
        };
        (status, Json(json!({ "error": self.to_string() }))).into_response()
    }
}

/// Errors that stop the server from starting or serving.
#[derive(Debug)]
pub enum StartupError {
    /// Configuration could not be loaded.
    Config { details: String },
    /// The relationship store could not be reached.
    Store { details: String },
    /// The token verifier could not be built.
    Verifier { details: String },
    /// The listener could not bind.
    Bind { addr: String, details: String },
    /// The server stopped with an error.
    Serve { details: String },
}

impl fmt::Display for StartupError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Config { details } => write!(f, "failed to load configuration: {details}"),
            Self::Store { details } => {
                write!(f, "failed to connect to relationship store: {details}")
            }
            Self::Verifier { details } => {
                write!(f, "failed to build token verifier: {details}")
            }
            Self::Bind { addr, details } => write!(f, "failed to bind to {addr}: {details}"),
            Self::Serve { details } => write!(f, "server error: {details}"),
        }
    }
}

impl std::error::Error for StartupError {}
