use std::process::ExitCode;
use std::sync::Arc;
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use warden_authz::GraphAccessProvider;
use warden_platform_access::{ClaimMapperConfig, TokenClaimMapper, TokenInfoVerifier};
use warden_server::{config::ServerConfig, error::StartupError, routes, state::AppState};

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    match run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!(error = %e, "server failed");
            ExitCode::FAILURE
        }
    }
}

async fn run() -> Result<(), StartupError> {
    // Load configuration from environment
    let config = ServerConfig::from_env().map_err(|e| StartupError::Config {
        details: e.to_string(),
    })?;
    tracing::info!("Loaded configuration");

    let state = if config.auth.enabled() {
        tracing::info!(kind = ?config.auth.store().kind, "Connecting to relationship store...");
        let store = config
            .auth
            .store()
            .connect()
            .await
            .map_err(|e| StartupError::Store {
                details: e.to_string(),
            })?;

        let verifier =
            TokenInfoVerifier::from_config(&config.auth).map_err(|e| StartupError::Verifier {
                details: e.to_string(),
            })?;

        let mapper = TokenClaimMapper::new(
            Arc::new(verifier),
            Arc::new(GraphAccessProvider::new(store)),
            ClaimMapperConfig::from(&config.auth),
        );
        AppState::enforcing(mapper, config.authorization_timeout())
    } else {
        tracing::warn!("Authorization is DISABLED; every call will be allowed");
        AppState::allow_all()
    };

    let app = routes::router(Arc::new(state)).layer(TraceLayer::new_for_http());

    let listener = tokio::net::TcpListener::bind(&config.listen_addr)
        .await
        .map_err(|e| StartupError::Bind {
            addr: config.listen_addr.clone(),
            details: e.to_string(),
        })?;

    tracing::info!("listening on http://{}", config.listen_addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| StartupError::Serve {
            details: e.to_string(),
        })
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutting down");
}
