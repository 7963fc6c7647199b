//! OpenFGA relationship store over its HTTP API.

use crate::config::OpenFgaParams;
use crate::error::AuthzError;
use crate::store::RelationshipStore;
use crate::types::{Entity, Tuple, TuplePage, TuplePattern};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};
use warden_core::Result;

/// OpenFGA store client.
///
/// Holds a pooled HTTP client that is shared by all concurrent callers.
#[derive(Clone)]
pub struct OpenFgaStore {
    http: reqwest::Client,
    base_url: String,
    store_id: String,
    token: String,
}

#[derive(Serialize)]
struct ReadRequest {
    tuple_key: ReadTupleKey,
    page_size: u32,
    #[serde(skip_serializing_if = "String::is_empty")]
    continuation_token: String,
}

#[derive(Serialize)]
struct ReadTupleKey {
    user: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    relation: String,
    object: String,
}

#[derive(Deserialize)]
struct ReadResponse {
    #[serde(default)]
    tuples: Vec<ReadTuple>,
    #[serde(default)]
    continuation_token: String,
}

#[derive(Deserialize)]
struct ReadTuple {
    key: TupleKey,
}

#[derive(Deserialize)]
struct TupleKey {
    user: String,
    relation: String,
    object: String,
}

impl OpenFgaStore {
    /// Connects to an OpenFGA store.
    ///
    /// The configured authorization model is fetched once so that a wrong
    /// store or model ID fails at startup instead of on the first call.
    pub async fn connect(params: &OpenFgaParams) -> Result<Self, AuthzError> {
        let store = Self::new(params)?;
        let url = format!(
            "{}/stores/{}/authorization-models/{}",
            store.base_url, store.store_id, params.auth_model_id
        );
        let response = store
            .authorized(store.http.get(&url))
            .send()
            .await
            .map_err(|e| AuthzError::ConnectionFailed {
                details: e.to_string(),
            })?;

        if !response.status().is_success() {
            return Err(AuthzError::ConnectionFailed {
                details: format!(
                    "authorization model {} not available: {}",
                    params.auth_model_id,
                    response.status()
                ),
            }
            .into());
        }

        debug!(store_id = %store.store_id, "connected to OpenFGA");
        Ok(store)
    }

    /// Creates a client without contacting the store.
    pub fn new(params: &OpenFgaParams) -> Result<Self, AuthzError> {
        if params.api_host.is_empty() || params.store_id.is_empty() {
            return Err(AuthzError::InvalidInput {
                details: "OpenFGA host and store ID are required".to_string(),
            }
            .into());
        }

        let http = reqwest::Client::builder()
            .build()
            .map_err(|e| AuthzError::ConnectionFailed {
                details: format!("failed to create HTTP client: {}", e),
            })?;

        Ok(Self {
            http,
            base_url: format!(
                "{}://{}:{}",
                params.api_scheme, params.api_host, params.api_port
            ),
            store_id: params.store_id.clone(),
            token: params.token.clone(),
        })
    }

    fn authorized(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        if self.token.is_empty() {
            request
        } else {
            request.bearer_auth(&self.token)
        }
    }
}

fn read_request(pattern: &TuplePattern, page_size: u32, continuation_token: &str) -> ReadRequest {
    ReadRequest {
        tuple_key: ReadTupleKey {
            user: pattern.object.to_string(),
            relation: pattern.relation.clone(),
            object: pattern.target.to_string(),
        },
        page_size,
        continuation_token: continuation_token.to_string(),
    }
}

fn parse_entity(value: &str) -> Result<Entity, AuthzError> {
    Entity::parse(value).ok_or_else(|| {
        AuthzError::MalformedResponse {
            details: format!("'{}' is not a kind:id reference", value),
        }
        .into()
    })
}

fn tuple_from_key(key: TupleKey) -> Result<Tuple, AuthzError> {
    Ok(Tuple::new(
        parse_entity(&key.user)?,
        key.relation,
        parse_entity(&key.object)?,
    ))
}

#[async_trait]
impl RelationshipStore for OpenFgaStore {
    #[instrument(skip(self, continuation_token), fields(object = %pattern.object, target = %pattern.target))]
    async fn find_matching_tuples(
        &self,
        pattern: &TuplePattern,
        page_size: u32,
        continuation_token: &str,
    ) -> Result<TuplePage, AuthzError> {
        let url = format!("{}/stores/{}/read", self.base_url, self.store_id);
        let response = self
            .authorized(self.http.post(&url))
            .json(&read_request(pattern, page_size, continuation_token))
            .send()
            .await
            .map_err(|e| AuthzError::RequestFailed {
                details: e.to_string(),
            })?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(AuthzError::UnexpectedStatus {
                status: status.as_u16(),
                message,
            }
            .into());
        }

        let body: ReadResponse =
            response
                .json()
                .await
                .map_err(|e| AuthzError::MalformedResponse {
                    details: e.to_string(),
                })?;

        let tuples = body
            .tuples
            .into_iter()
            .map(|tuple| tuple_from_key(tuple.key))
            .collect::<Result<Vec<_>, AuthzError>>()?;

        debug!(count = tuples.len(), more = !body.continuation_token.is_empty(), "read tuples");
        Ok(TuplePage {
            tuples,
            continuation_token: body.continuation_token,
        })
    }
}
