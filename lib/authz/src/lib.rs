//! Relationship-graph store clients for warden.
//!
//! Namespace grants are not stored alongside the orchestration server; they
//! live in an external relationship graph (OpenFGA or SpiceDB). This crate
//! exposes the single primitive the authorization pipeline needs from that
//! graph, a paginated "find matching tuples" query ([`RelationshipStore`]),
//! and builds group-membership and namespace-access lookups on top of it
//! ([`GraphAccessProvider`]).

mod access;
mod client;
mod config;
mod error;
mod openfga;
mod store;
mod types;

pub use access::{DEFAULT_PAGE_SIZE, GraphAccessProvider, NamespaceAccessProvider};
pub use client::SpiceDbStore;
pub use config::{OpenFgaParams, SpiceDbParams, StoreConfig, StoreKind};
pub use error::AuthzError;
pub use openfga::OpenFgaStore;
pub use store::RelationshipStore;
pub use types::{Entity, NamespaceAccess, Tuple, TuplePage, TuplePattern};
