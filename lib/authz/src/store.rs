//! The relationship-store capability.

use crate::error::AuthzError;
use crate::types::{TuplePage, TuplePattern};
use async_trait::async_trait;
use warden_core::Result;

/// A relationship-graph store that can list tuples matching a pattern.
///
/// Results are cursor-paginated: a response never holds more than
/// `page_size` tuples, and a non-empty `continuation_token` in the returned
/// page must be passed back unmodified to fetch the next one.
///
/// Implementations are shared across concurrent calls.
#[async_trait]
pub trait RelationshipStore: Send + Sync {
    /// Fetches one page of tuples matching `pattern`.
    async fn find_matching_tuples(
        &self,
        pattern: &TuplePattern,
        page_size: u32,
        continuation_token: &str,
    ) -> Result<TuplePage, AuthzError>;
}
