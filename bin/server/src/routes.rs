//! HTTP routes for the authorization endpoint.

use crate::error::AuthorizeError;
use crate::state::AppState;
use axum::{
    Json, Router,
    extract::State,
    http::{HeaderMap, header::AUTHORIZATION},
    routing::{get, post},
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, warn};
use warden_core::{CallTarget, Decision};
use warden_platform_access::ClaimError;

/// Body of a successful `/authorize` response.
#[derive(Debug, Serialize, Deserialize)]
pub struct AuthorizeResponse {
    /// Whether the call may proceed.
    pub decision: Decision,
}

/// Builds the router.
pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/authorize", post(authorize))
        .route("/healthz", get(healthz))
        .with_state(state)
}

/// Decides whether the bearer of the `Authorization` header may make the
/// call described in the body.
///
/// POST /authorize
async fn authorize(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(target): Json<CallTarget>,
) -> Result<Json<AuthorizeResponse>, AuthorizeError> {
    match decide(&state, &headers, &target).await {
        Ok(decision) => {
            debug!(api = %target.api_name, namespace = %target.namespace, %decision, "authorized call");
            Ok(Json(AuthorizeResponse { decision }))
        }
        Err(e) => {
            warn!(
                api = %target.api_name,
                namespace = %target.namespace,
                error = %e,
                "failed to authorize call"
            );
            Err(e)
        }
    }
}

async fn decide(
    state: &AppState,
    headers: &HeaderMap,
    target: &CallTarget,
) -> Result<Decision, AuthorizeError> {
    let auth_header = match headers.get(AUTHORIZATION) {
        Some(value) => value
            .to_str()
            .map_err(|_| ClaimError::InvalidTokenLength)?,
        None => "",
    };
    state.decide(auth_header, target).await
}

/// GET /healthz
async fn healthz() -> &'static str {
    "ok"
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use axum::{
        body::Body,
        http::{Request, StatusCode},
    };
    use http_body_util::BodyExt;
    use std::time::Duration;
    use tower::ServiceExt;
    use tracing_test::traced_test;
    use warden_authz::{AuthzError, NamespaceAccess, NamespaceAccessProvider};
    use warden_platform_access::{
        ClaimMapperConfig, IntrospectionError, TokenClaimMapper, TokenInfo, TokenVerifier,
        ValidationError,
    };

    struct FakeVerifier {
        info: Result<TokenInfo, IntrospectionError>,
        delay: Duration,
    }

    impl FakeVerifier {
        fn accepting() -> Self {
            Self {
                info: Ok(TokenInfo {
                    email: "user@example.com".to_string(),
                    ..TokenInfo::default()
                }),
                delay: Duration::ZERO,
            }
        }
    }

    #[async_trait]
    impl TokenVerifier for FakeVerifier {
        async fn get_token_info(
            &self,
            _access_token: &str,
        ) -> Result<TokenInfo, IntrospectionError> {
            if !self.delay.is_zero() {
                tokio::time::sleep(self.delay).await;
            }
            self.info.clone()
        }

        fn verify_token(&self, _token: &TokenInfo) -> Result<(), ValidationError> {
            Ok(())
        }
    }

    struct FakeAccess {
        fail: bool,
    }

    #[async_trait]
    impl NamespaceAccessProvider for FakeAccess {
        async fn get_user_groups(
            &self,
            _email: &str,
        ) -> warden_core::Result<Vec<String>, AuthzError> {
            if self.fail {
                return Err(AuthzError::ConnectionFailed {
                    details: "connection refused".to_string(),
                }
                .into());
            }
            Ok(vec!["payments-team".to_string()])
        }

        async fn get_namespace_access_information(
            &self,
            _email: &str,
            _groups: &[String],
        ) -> warden_core::Result<Vec<NamespaceAccess>, AuthzError> {
            Ok(vec![NamespaceAccess::new("payments", "writer")])
        }
    }

    fn enforcing_app(verifier: FakeVerifier, access: FakeAccess, timeout: Duration) -> Router {
        let mapper = TokenClaimMapper::new(
            Arc::new(verifier),
            Arc::new(access),
            ClaimMapperConfig::default(),
        );
        router(Arc::new(AppState::enforcing(mapper, timeout)))
    }

    fn default_app() -> Router {
        enforcing_app(
            FakeVerifier::accepting(),
            FakeAccess { fail: false },
            Duration::from_secs(5),
        )
    }

    fn authorize_request(auth_header: Option<&str>, api_name: &str, namespace: &str) -> Request<Body> {
        let mut builder = Request::builder()
            .method("POST")
            .uri("/authorize")
            .header("content-type", "application/json");
        if let Some(value) = auth_header {
            builder = builder.header("authorization", value);
        }
        let body = serde_json::json!({ "api_name": api_name, "namespace": namespace });
        builder.body(Body::from(body.to_string())).unwrap()
    }

    async fn json_body(response: axum::response::Response) -> serde_json::Value {
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn healthz_returns_ok() {
        let response = default_app()
            .oneshot(Request::get("/healthz").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        assert_eq!(&bytes[..], b"ok");
    }

    #[tokio::test]
    async fn writer_may_start_workflows_in_granted_namespace() {
        let response = default_app()
            .oneshot(authorize_request(
                Some("Bearer token"),
                "/temporal.api.workflowservice.v1.WorkflowService/StartWorkflowExecution",
                "payments",
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(json_body(response).await["decision"], "allow");
    }

    #[tokio::test]
    async fn denial_is_a_successful_response() {
        let response = default_app()
            .oneshot(authorize_request(
                Some("Bearer token"),
                "StartWorkflowExecution",
                "billing",
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(json_body(response).await["decision"], "deny");
    }

    #[tokio::test]
    async fn missing_credentials_are_unauthorized() {
        let response = default_app()
            .oneshot(authorize_request(None, "ListNamespaces", ""))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(json_body(response).await["error"], "no auth token provided");
    }

    #[tokio::test]
    async fn rejected_token_is_unauthorized() {
        let verifier = FakeVerifier {
            info: Err(IntrospectionError::Status {
                status: 400,
                reason: "Bad Request".to_string(),
            }),
            delay: Duration::ZERO,
        };
        let app = enforcing_app(verifier, FakeAccess { fail: false }, Duration::from_secs(5));

        let response = app
            .oneshot(authorize_request(Some("Bearer expired"), "ListNamespaces", ""))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn store_failure_is_unavailable() {
        let app = enforcing_app(
            FakeVerifier::accepting(),
            FakeAccess { fail: true },
            Duration::from_secs(5),
        );

        let response = app
            .oneshot(authorize_request(Some("Bearer token"), "ListNamespaces", ""))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
        let body = json_body(response).await;
        assert!(
            body["error"]
                .as_str()
                .unwrap()
                .starts_with("error reading group membership")
        );
    }

    #[tokio::test]
    #[traced_test]
    async fn slow_resolution_times_out() {
        let verifier = FakeVerifier {
            delay: Duration::from_secs(10),
            ..FakeVerifier::accepting()
        };
        let app = enforcing_app(verifier, FakeAccess { fail: false }, Duration::from_millis(20));

        let response = app
            .oneshot(authorize_request(
                Some("Bearer token"),
                "StartWorkflowExecution",
                "payments",
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::GATEWAY_TIMEOUT);
        assert!(logs_contain("failed to authorize call"));
        assert!(logs_contain("StartWorkflowExecution"));
        assert!(logs_contain("payments"));
        assert!(logs_contain("did not complete within 20ms"));
    }

    #[tokio::test]
    #[traced_test]
    async fn rejected_header_is_logged_with_target() {
        let response = default_app()
            .oneshot(authorize_request(Some("Basic dXNlcg=="), "DescribeNamespace", "billing"))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert!(logs_contain("invalid token length"));
        assert!(logs_contain("DescribeNamespace"));
        assert!(logs_contain("billing"));
    }

    #[tokio::test]
    #[traced_test]
    async fn non_ascii_header_is_unauthorized_and_logged() {
        let mut request = authorize_request(None, "ListNamespaces", "");
        request.headers_mut().insert(
            AUTHORIZATION,
            axum::http::HeaderValue::from_bytes(b"Bearer \xff").unwrap(),
        );

        let response = default_app().oneshot(request).await.unwrap();

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert!(logs_contain("failed to authorize call"));
        assert!(logs_contain("ListNamespaces"));
    }

    #[tokio::test]
    async fn disabled_authorization_allows_everything() {
        let app = router(Arc::new(AppState::allow_all()));

        let response = app
            .oneshot(authorize_request(None, "DeleteNamespace", "payments"))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(json_body(response).await["decision"], "allow");
    }
}
