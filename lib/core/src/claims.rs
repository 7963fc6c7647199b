//! Per-call authorization claims, call targets, and decisions.

use crate::role::Role;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Authorization attributes resolved for one caller on one call.
///
/// `namespaces` maps namespace names to roles. The empty-string key is the
/// global pseudo-namespace used for discovery calls; whenever the map is
/// non-empty it holds at least `Reader` there.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    /// System-wide role; satisfies any namespace target.
    pub system: Role,
    /// Per-namespace roles.
    pub namespaces: BTreeMap<String, Role>,
}

impl Claims {
    /// Creates claims with no grants at all.
    #[must_use]
    pub fn none() -> Self {
        Self::default()
    }

    /// Creates claims carrying only a system-wide role.
    #[must_use]
    pub fn system(role: Role) -> Self {
        Self {
            system: role,
            namespaces: BTreeMap::new(),
        }
    }

    /// Returns the role held on `namespace`, `Role::None` when absent.
    #[must_use]
    pub fn namespace_role(&self, namespace: &str) -> Role {
        self.namespaces.get(namespace).copied().unwrap_or_default()
    }

    /// Returns true if the claims grant nothing.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.system == Role::None && self.namespaces.is_empty()
    }
}

/// The API and namespace a call is directed at.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CallTarget {
    /// Fully qualified (`/pkg.Service/Method`) or short method name.
    pub api_name: String,
    /// Target namespace, empty for global calls.
    #[serde(default)]
    pub namespace: String,
}

impl CallTarget {
    /// Creates a new call target.
    #[must_use]
    pub fn new(api_name: impl Into<String>, namespace: impl Into<String>) -> Self {
        Self {
            api_name: api_name.into(),
            namespace: namespace.into(),
        }
    }
}

/// Outcome of an access decision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Decision {
    /// The call may proceed.
    Allow,
    /// The call must be rejected.
    Deny,
}

impl Decision {
    /// Returns true for `Allow`.
    #[must_use]
    pub fn is_allow(&self) -> bool {
        matches!(self, Self::Allow)
    }
}

impl fmt::Display for Decision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Allow => write!(f, "allow"),
            Self::Deny => write!(f, "deny"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn namespace_role_defaults_to_none() {
        let mut claims = Claims::none();
        claims.namespaces.insert("ns1".to_string(), Role::Writer);

        assert_eq!(claims.namespace_role("ns1"), Role::Writer);
        assert_eq!(claims.namespace_role("ns2"), Role::None);
        assert_eq!(claims.namespace_role(""), Role::None);
    }

    #[test]
    fn system_claims_have_no_namespaces() {
        let claims = Claims::system(Role::Writer);
        assert_eq!(claims.system, Role::Writer);
        assert!(claims.namespaces.is_empty());
        assert!(!claims.is_empty());
        assert!(Claims::none().is_empty());
    }

    #[test]
    fn call_target_namespace_defaults_to_empty() {
        let target: CallTarget =
            serde_json::from_str(r#"{"api_name": "ListNamespaces"}"#).expect("deserialize");
        assert_eq!(target, CallTarget::new("ListNamespaces", ""));
    }

    #[test]
    fn decision_serialization_format() {
        assert_eq!(
            serde_json::to_string(&Decision::Allow).expect("serialize"),
            "\"allow\""
        );
        assert_eq!(Decision::Deny.to_string(), "deny");
        assert!(!Decision::Deny.is_allow());
    }
}
