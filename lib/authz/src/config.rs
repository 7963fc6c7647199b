//! Relationship store connection configuration.

use crate::client::SpiceDbStore;
use crate::error::AuthzError;
use crate::openfga::OpenFgaStore;
use crate::store::RelationshipStore;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use warden_core::Result;

/// Which relationship store backend to use.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StoreKind {
    /// OpenFGA over HTTP.
    #[default]
    OpenFga,
    /// SpiceDB over gRPC.
    SpiceDb,
}

/// Relationship store configuration.
///
/// Only the section matching `kind` is read, e.g. with environment variables
/// `AUTH__STORE__KIND=openfga` and `AUTH__STORE__OPENFGA__API_HOST=fga.internal`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StoreConfig {
    /// Backend selector.
    #[serde(default)]
    pub kind: StoreKind,
    /// OpenFGA connection parameters.
    #[serde(default)]
    pub openfga: Option<OpenFgaParams>,
    /// SpiceDB connection parameters.
    #[serde(default)]
    pub spicedb: Option<SpiceDbParams>,
}

/// Connection parameters for an OpenFGA store.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OpenFgaParams {
    /// Either "http" or "https".
    #[serde(default = "default_api_scheme")]
    pub api_scheme: String,
    /// Host of the OpenFGA API, without scheme.
    pub api_host: String,
    /// Port of the OpenFGA API.
    #[serde(default = "default_api_port")]
    pub api_port: u16,
    /// Bearer token sent with every request; empty for none.
    #[serde(default)]
    pub token: String,
    /// ID of the store holding the relationship tuples.
    pub store_id: String,
    /// ID of the authorization model in use.
    pub auth_model_id: String,
}

/// Connection parameters for a SpiceDB instance.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpiceDbParams {
    /// gRPC endpoint (e.g., "http://localhost:50051").
    pub endpoint: String,
    /// Preshared key used for authentication.
    pub preshared_key: String,
}

fn default_api_scheme() -> String {
    "http".to_string()
}

fn default_api_port() -> u16 {
    8080
}

impl StoreConfig {
    /// Connects to the configured backend.
    ///
    /// # Errors
    ///
    /// Returns an error if the selected backend has no parameters or the
    /// store cannot be reached.
    pub async fn connect(&self) -> Result<Arc<dyn RelationshipStore>, AuthzError> {
        match self.kind {
            StoreKind::OpenFga => {
                let params = self.openfga.as_ref().ok_or_else(|| missing_section("openfga"))?;
                Ok(Arc::new(OpenFgaStore::connect(params).await?))
            }
            StoreKind::SpiceDb => {
                let params = self.spicedb.as_ref().ok_or_else(|| missing_section("spicedb"))?;
                Ok(Arc::new(
                    SpiceDbStore::new(params.endpoint.clone(), params.preshared_key.clone())
                        .await?,
                ))
            }
        }
    }
}

fn missing_section(section: &str) -> AuthzError {
    AuthzError::InvalidInput {
        details: format!("store kind is {section} but no {section} parameters are configured"),
    }
}
