//! SpiceDB relationship store over gRPC.

use crate::error::AuthzError;
use crate::store::RelationshipStore;
use crate::types::{Entity, Tuple, TuplePage, TuplePattern};
use async_trait::async_trait;
use spicedb_client::SpicedbClient;
use spicedb_grpc::authzed::api::v1::{
    Consistency, Cursor, ReadRelationshipsRequest, Relationship, RelationshipFilter, SubjectFilter,
    subject_filter::RelationFilter,
};
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, instrument};
use warden_core::Result;

/// SpiceDB store client.
///
/// SpiceDB names the two sides of a relationship `resource#relation@subject`;
/// a tuple's object is the subject and its target is the resource.
///
/// This wrapper handles the lifetime constraints of the underlying SpiceDB client
/// by maintaining a persistent connection that's protected by a mutex.
#[derive(Clone)]
pub struct SpiceDbStore {
    inner: Arc<Mutex<SpicedbClient>>,
}

impl SpiceDbStore {
    /// Connects to SpiceDB.
    ///
    /// Note: The endpoint and preshared_key are leaked to satisfy the 'static
    /// lifetime requirements of the underlying gRPC client. The store is
    /// expected to live for the duration of the process.
    pub async fn new(endpoint: String, preshared_key: String) -> Result<Self, AuthzError> {
        let endpoint: &'static str = Box::leak(endpoint.into_boxed_str());
        let preshared_key: &'static str = Box::leak(preshared_key.into_boxed_str());

        let client = SpicedbClient::from_url_and_preshared_key(endpoint, preshared_key)
            .await
            .map_err(|e| AuthzError::ConnectionFailed {
                details: e.to_string(),
            })?;

        Ok(Self {
            inner: Arc::new(Mutex::new(client)),
        })
    }
}

fn read_request(
    pattern: &TuplePattern,
    page_size: u32,
    continuation_token: &str,
) -> ReadRelationshipsRequest {
    let (subject_id, subject_relation) = pattern.object.userset();

    ReadRelationshipsRequest {
        consistency: Some(Consistency {
            requirement: Some(
                spicedb_grpc::authzed::api::v1::consistency::Requirement::FullyConsistent(true),
            ),
        }),
        relationship_filter: Some(RelationshipFilter {
            resource_type: pattern.target.kind.clone(),
            optional_resource_id: pattern.target.id.clone(),
            optional_relation: pattern.relation.clone(),
            optional_subject_filter: Some(SubjectFilter {
                subject_type: pattern.object.kind.clone(),
                optional_subject_id: subject_id.to_string(),
                optional_relation: subject_relation.map(|relation| RelationFilter {
                    relation: relation.to_string(),
                }),
            }),
            optional_resource_id_prefix: String::new(),
        }),
        optional_limit: page_size,
        optional_cursor: (!continuation_token.is_empty()).then(|| Cursor {
            token: continuation_token.to_string(),
        }),
        ..Default::default()
    }
}

fn tuple_from_relationship(relationship: Relationship) -> Result<Tuple, AuthzError> {
    let resource = relationship
        .resource
        .ok_or_else(|| AuthzError::MalformedResponse {
            details: "relationship without resource".to_string(),
        })?;
    let subject = relationship
        .subject
        .ok_or_else(|| AuthzError::MalformedResponse {
            details: "relationship without subject".to_string(),
        })?;
    let subject_object = subject.object.ok_or_else(|| AuthzError::MalformedResponse {
        details: "relationship subject without object".to_string(),
    })?;

    let object_id = if subject.optional_relation.is_empty() {
        subject_object.object_id
    } else {
        format!("{}#{}", subject_object.object_id, subject.optional_relation)
    };

    Ok(Tuple::new(
        Entity::new(subject_object.object_type, object_id),
        relationship.relation,
        Entity::new(resource.object_type, resource.object_id),
    ))
}

/// Token for the page after one holding `count` results.
///
/// SpiceDB gives no end-of-results marker, so only a full page resumes;
/// anything shorter is the last page. An unlimited read (`page_size == 0`)
/// is always complete.
fn next_token(count: usize, page_size: u32, last_cursor: Option<Cursor>) -> String {
    let full_page = page_size > 0 && count >= page_size as usize;
    match last_cursor {
        Some(cursor) if full_page => cursor.token,
        _ => String::new(),
    }
}

#[async_trait]
impl RelationshipStore for SpiceDbStore {
    #[instrument(skip(self, continuation_token), fields(object = %pattern.object, target = %pattern.target))]
    async fn find_matching_tuples(
        &self,
        pattern: &TuplePattern,
        page_size: u32,
        continuation_token: &str,
    ) -> Result<TuplePage, AuthzError> {
        use tokio_stream::StreamExt;

        let request = read_request(pattern, page_size, continuation_token);

        let mut client = self.inner.lock().await;
        let mut response =
            client
                .read_relationships(request)
                .await
                .map_err(|e| AuthzError::RequestFailed {
                    details: e.to_string(),
                })?;

        // The stream ends after `page_size` results; the cursor of the last
        // one resumes the read.
        let mut tuples = Vec::new();
        let mut last_cursor = None;
        while let Some(result) = response.next().await {
            match result {
                Ok(r) => {
                    if let Some(relationship) = r.relationship {
                        tuples.push(tuple_from_relationship(relationship)?);
                    }
                    last_cursor = r.after_result_cursor;
                }
                Err(e) => {
                    return Err(AuthzError::RequestFailed {
                        details: e.to_string(),
                    }
                    .into());
                }
            }
        }

        let continuation_token = next_token(tuples.len(), page_size, last_cursor);

        debug!(count = tuples.len(), more = !continuation_token.is_empty(), "read relationships");
        Ok(TuplePage {
            tuples,
            continuation_token,
        })
    }
}
