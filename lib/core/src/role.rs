//! Privilege levels used by authorization claims.
//!
//! Roles form a total order: `None < Reader < Writer < Admin`. Every
//! access check compares roles through this ordering alone.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Privilege level held by a caller, either system-wide or on a namespace.
#[derive(
    Debug, Default, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// No access.
    #[default]
    None,
    /// Read-only access.
    Reader,
    /// Read and write access.
    Writer,
    /// Administrative access.
    Admin,
}

impl Role {
    /// Maps a relationship-graph relation name to a role.
    ///
    /// Unknown relations carry no grant and yield `None` (the `Option`), not
    /// an error.
    #[must_use]
    pub fn from_relation(relation: &str) -> Option<Self> {
        match relation {
            "reader" => Some(Self::Reader),
            "writer" => Some(Self::Writer),
            "admin" => Some(Self::Admin),
            _ => None,
        }
    }

    /// Returns the lowercase role name.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::None => "none",
            Self::Reader => "reader",
            Self::Writer => "writer",
            Self::Admin => "admin",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
