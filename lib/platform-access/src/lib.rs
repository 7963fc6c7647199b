//! Token verification, claim resolution, and access decisions for warden.
//!
//! This crate provides the three stages every call passes through:
//! - Token verification (`TokenVerifier`, `TokenInfoVerifier`)
//! - Claim resolution from the relationship graph (`TokenClaimMapper`)
//! - Access decisions against the API classification (`Authorizer`)
//!
//! # Example
//!
//! ```
//! use warden_core::{CallTarget, Claims, Decision, Role};
//! use warden_platform_access::Authorizer;
//!
//! let mut claims = Claims::none();
//! claims.namespaces.insert(String::new(), Role::Reader);
//! claims.namespaces.insert("payments".to_string(), Role::Writer);
//!
//! let authorizer = Authorizer::new();
//! let start = CallTarget::new(
//!     "/temporal.api.workflowservice.v1.WorkflowService/StartWorkflowExecution",
//!     "payments",
//! );
//! assert_eq!(authorizer.authorize(Some(&claims), &start), Decision::Allow);
//!
//! let create = CallTarget::new("CreateNamespace", "");
//! assert_eq!(authorizer.authorize(Some(&claims), &create), Decision::Deny);
//! ```

pub mod api;
pub mod authorizer;
pub mod config;
pub mod error;
pub mod mapper;
pub mod token;

// Re-export main types at crate root
pub use api::{ApiAccess, classify};
pub use authorizer::{Authorizer, short_api_name};
pub use config::{AuthConfig, AuthConfigBuilder};
pub use error::{ClaimError, IntrospectionError, ValidationError};
pub use mapper::{ClaimMapperConfig, TokenClaimMapper};
pub use token::{SERVICE_ACCOUNT_SUFFIX, TokenInfo, TokenInfoVerifier, TokenVerifier};
