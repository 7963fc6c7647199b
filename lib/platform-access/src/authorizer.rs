//! Access decisions from resolved claims.

use crate::api::classify;
use tracing::warn;
use warden_core::{CallTarget, Claims, Decision};

/// Decides whether resolved claims permit a call.
///
/// The claims are trusted completely; no further checks are made on where
/// they came from.
#[derive(Debug, Clone, Copy, Default)]
pub struct Authorizer;

impl Authorizer {
    /// Creates a new authorizer.
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    /// Returns `Allow` if `claims` grant the role `target` requires, either
    /// system-wide or on the target namespace.
    ///
    /// Missing claims are denied.
    #[must_use]
    pub fn authorize(&self, claims: Option<&Claims>, target: &CallTarget) -> Decision {
        let api = short_api_name(&target.api_name);

        let Some(claims) = claims else {
            warn!(api, namespace = %target.namespace, "denied access, no claims provided");
            return Decision::Deny;
        };

        let required = classify(api).required_role();

        if claims.system >= required {
            return Decision::Allow;
        }

        if claims.namespace_role(&target.namespace) >= required {
            return Decision::Allow;
        }

        warn!(
            api,
            namespace = %target.namespace,
            required = %required,
            grants = ?claims.namespaces,
            "denied access"
        );
        Decision::Deny
    }
}

/// Strips the package and service path from a fully qualified method name,
/// e.g. `/temporal.api.workflowservice.v1.WorkflowService/StartWorkflowExecution`
/// becomes `StartWorkflowExecution`.
#[must_use]
pub fn short_api_name(api: &str) -> &str {
    match api.rfind('/') {
        Some(index) => &api[index + 1..],
        None => api,
    }
}
