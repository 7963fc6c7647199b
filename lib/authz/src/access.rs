//! Group-membership and namespace-access lookups over a relationship store.

use crate::error::AuthzError;
use crate::store::RelationshipStore;
use crate::types::{NamespaceAccess, Tuple, TuplePattern};
use async_trait::async_trait;
use std::collections::HashSet;
use std::sync::Arc;
use tracing::{debug, instrument};
use warden_core::Result;

/// Number of tuples requested per page.
pub const DEFAULT_PAGE_SIZE: u32 = 100;

/// Source of the group memberships and namespace grants of a user.
#[async_trait]
pub trait NamespaceAccessProvider: Send + Sync {
    /// Returns the names of every group the user is a member of.
    async fn get_user_groups(&self, email: &str) -> Result<Vec<String>, AuthzError>;

    /// Returns the namespace grants held through each of `groups`.
    ///
    /// Grants from different groups are concatenated in group order and are
    /// not deduplicated.
    async fn get_namespace_access_information(
        &self,
        email: &str,
        groups: &[String],
    ) -> Result<Vec<NamespaceAccess>, AuthzError>;
}

/// [`NamespaceAccessProvider`] that walks a [`RelationshipStore`], following
/// continuation tokens until each query is exhausted.
#[derive(Clone)]
pub struct GraphAccessProvider {
    store: Arc<dyn RelationshipStore>,
    page_size: u32,
}

impl GraphAccessProvider {
    /// Creates a provider using [`DEFAULT_PAGE_SIZE`].
    #[must_use]
    pub fn new(store: Arc<dyn RelationshipStore>) -> Self {
        Self::with_page_size(store, DEFAULT_PAGE_SIZE)
    }

    /// Creates a provider with a custom page size.
    #[must_use]
    pub fn with_page_size(store: Arc<dyn RelationshipStore>, page_size: u32) -> Self {
        Self { store, page_size }
    }

    /// Collects every tuple matching `pattern`, page by page.
    ///
    /// A failure on any page discards the pages already read.
    async fn find_all(&self, pattern: &TuplePattern) -> Result<Vec<Tuple>, AuthzError> {
        let mut tuples = Vec::new();
        let mut continuation_token = String::new();
        let mut seen_tokens = HashSet::new();
        let mut pages = 0usize;

        loop {
            let page = self
                .store
                .find_matching_tuples(pattern, self.page_size, &continuation_token)
                .await?;
            pages += 1;
            tuples.extend(page.tuples);

            if page.continuation_token.is_empty() {
                break;
            }
            // A token handed out twice would replay pages forever.
            if !seen_tokens.insert(page.continuation_token.clone()) {
                return Err(AuthzError::MalformedResponse {
                    details: format!(
                        "continuation token repeated after page {pages} for {}",
                        pattern.object
                    ),
                }
                .into());
            }
            continuation_token = page.continuation_token;
        }

        debug!(pages, count = tuples.len(), object = %pattern.object, "collected tuples");
        Ok(tuples)
    }
}

#[async_trait]
impl NamespaceAccessProvider for GraphAccessProvider {
    #[instrument(skip(self))]
    async fn get_user_groups(&self, email: &str) -> Result<Vec<String>, AuthzError> {
        let tuples = self.find_all(&TuplePattern::user_groups(email)).await?;
        Ok(tuples.into_iter().map(|tuple| tuple.target.id).collect())
    }

    #[instrument(skip(self))]
    async fn get_namespace_access_information(
        &self,
        email: &str,
        groups: &[String],
    ) -> Result<Vec<NamespaceAccess>, AuthzError> {
        let mut access = Vec::new();
        // Sequential in group order so that callers merging these grants see
        // a stable ordering.
        for group in groups {
            let tuples = self.find_all(&TuplePattern::group_namespaces(group)).await?;
            access.extend(
                tuples
                    .into_iter()
                    .map(|tuple| NamespaceAccess::new(tuple.target.id, tuple.relation)),
            );
        }
        Ok(access)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Entity, TuplePage};
    use std::collections::HashMap;
    use std::sync::Mutex;

    /// In-memory store serving pre-built pages per pattern subject.
    ///
    /// Page `n` is handed out for continuation token `"<subject>@<n>"`.
    #[derive(Default)]
    struct PagedStore {
        pages: HashMap<String, Vec<Vec<Tuple>>>,
        fail_on: Option<(String, usize)>,
        stuck: bool,
        cycle: Vec<&'static str>,
        calls: Mutex<Vec<(String, u32, String)>>,
    }

    impl PagedStore {
        fn with_pages(mut self, object: &Entity, pages: Vec<Vec<Tuple>>) -> Self {
            self.pages.insert(object.to_string(), pages);
            self
        }

        fn calls(&self) -> Vec<(String, u32, String)> {
            self.calls.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl RelationshipStore for PagedStore {
        async fn find_matching_tuples(
            &self,
            pattern: &TuplePattern,
            page_size: u32,
            continuation_token: &str,
        ) -> Result<TuplePage, AuthzError> {
            let subject = pattern.object.to_string();
            self.calls.lock().unwrap().push((
                subject.clone(),
                page_size,
                continuation_token.to_string(),
            ));

            let index = match continuation_token.rsplit_once('@') {
                Some((_, n)) => n.parse::<usize>().unwrap(),
                None => 0,
            };
            if let Some((fail_subject, fail_index)) = &self.fail_on {
                if *fail_subject == subject && *fail_index == index {
                    return Err(AuthzError::RequestFailed {
                        details: "store unavailable".to_string(),
                    }
                    .into());
                }
            }
            if !self.cycle.is_empty() {
                let served = self.calls.lock().unwrap().len() - 1;
                return Ok(TuplePage {
                    tuples: Vec::new(),
                    continuation_token: self.cycle[served % self.cycle.len()].to_string(),
                });
            }
            if self.stuck {
                return Ok(TuplePage {
                    tuples: Vec::new(),
                    continuation_token: "same".to_string(),
                });
            }

            let pages = self.pages.get(&subject).cloned().unwrap_or_default();
            let tuples = pages.get(index).cloned().unwrap_or_default();
            let continuation_token = if index + 1 < pages.len() {
                format!("{subject}@{}", index + 1)
            } else {
                String::new()
            };
            Ok(TuplePage {
                tuples,
                continuation_token,
            })
        }
    }

    fn membership(email: &str, group: &str) -> Tuple {
        Tuple::new(Entity::user(email), "member", Entity::new("group", group))
    }

    fn grant(group: &str, relation: &str, namespace: &str) -> Tuple {
        Tuple::new(
            Entity::group_members(group),
            relation,
            Entity::new("namespace", namespace),
        )
    }

    const EMAIL: &str = "alice@example.com";

    #[tokio::test]
    async fn user_groups_follow_all_pages() {
        let store = Arc::new(PagedStore::default().with_pages(
            &Entity::user(EMAIL),
            vec![
                vec![membership(EMAIL, "a"), membership(EMAIL, "b")],
                vec![membership(EMAIL, "c")],
                vec![membership(EMAIL, "d")],
            ],
        ));
        let provider = GraphAccessProvider::new(store.clone());

        let groups = provider.get_user_groups(EMAIL).await.unwrap();

        assert_eq!(groups, vec!["a", "b", "c", "d"]);
        let calls = store.calls();
        assert_eq!(calls.len(), 3);
        assert_eq!(calls[0].2, "");
        assert_eq!(calls[1].2, "user:alice@example.com@1");
        assert_eq!(calls[2].2, "user:alice@example.com@2");
        assert!(calls.iter().all(|(_, size, _)| *size == DEFAULT_PAGE_SIZE));
    }

    #[tokio::test]
    async fn user_without_memberships_has_no_groups() {
        let store = Arc::new(PagedStore::default());
        let provider = GraphAccessProvider::new(store.clone());

        let groups = provider.get_user_groups(EMAIL).await.unwrap();

        assert!(groups.is_empty());
        assert_eq!(store.calls().len(), 1);
    }

    #[tokio::test]
    async fn namespace_access_is_paginated_per_group_in_order() {
        let store = Arc::new(
            PagedStore::default()
                .with_pages(
                    &Entity::group_members("eng"),
                    vec![
                        vec![grant("eng", "reader", "ns1")],
                        vec![grant("eng", "writer", "ns2")],
                    ],
                )
                .with_pages(
                    &Entity::group_members("ops"),
                    vec![vec![grant("ops", "writer", "ns1")]],
                ),
        );
        let provider = GraphAccessProvider::with_page_size(store.clone(), 1);

        let access = provider
            .get_namespace_access_information(EMAIL, &["eng".to_string(), "ops".to_string()])
            .await
            .unwrap();

        assert_eq!(
            access,
            vec![
                NamespaceAccess::new("ns1", "reader"),
                NamespaceAccess::new("ns2", "writer"),
                NamespaceAccess::new("ns1", "writer"),
            ]
        );
        let subjects: Vec<String> = store.calls().into_iter().map(|call| call.0).collect();
        assert_eq!(
            subjects,
            vec!["group:eng#member", "group:eng#member", "group:ops#member"]
        );
    }

    #[tokio::test]
    async fn no_groups_means_no_namespace_queries() {
        let store = Arc::new(PagedStore::default());
        let provider = GraphAccessProvider::new(store.clone());

        let access = provider
            .get_namespace_access_information(EMAIL, &[])
            .await
            .unwrap();

        assert!(access.is_empty());
        assert!(store.calls().is_empty());
    }

    #[tokio::test]
    async fn failure_on_later_page_discards_partial_results() {
        let mut store = PagedStore::default().with_pages(
            &Entity::user(EMAIL),
            vec![vec![membership(EMAIL, "a")], vec![membership(EMAIL, "b")]],
        );
        store.fail_on = Some(("user:alice@example.com".to_string(), 1));
        let provider = GraphAccessProvider::new(Arc::new(store));

        let err = provider.get_user_groups(EMAIL).await.unwrap_err();

        assert!(err.to_string().contains("store unavailable"));
    }

    #[tokio::test]
    async fn non_advancing_token_is_an_error() {
        let store = PagedStore {
            stuck: true,
            ..PagedStore::default()
        };
        let provider = GraphAccessProvider::new(Arc::new(store));

        let err = provider.get_user_groups(EMAIL).await.unwrap_err();

        assert!(err.to_string().contains("continuation token repeated"));
    }

    #[tokio::test]
    async fn cycling_tokens_are_an_error() {
        let store = Arc::new(PagedStore {
            cycle: vec!["A", "B"],
            ..PagedStore::default()
        });
        let provider = GraphAccessProvider::new(store.clone());

        let err = provider.get_user_groups(EMAIL).await.unwrap_err();

        assert!(err.to_string().contains("continuation token repeated"));
        let tokens: Vec<String> = store.calls().into_iter().map(|call| call.2).collect();
        assert_eq!(tokens, vec!["", "A", "B"]);
    }
}
