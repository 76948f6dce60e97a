//! pubsub-relay server entry point.
//!
//! Starts the Axum HTTP server with the publish endpoint and the
//! subscriber WebSocket.

use std::sync::Arc;

use tracing_subscriber::EnvFilter;

use pubsub_relay::api;
use pubsub_relay::app_state::AppState;
use pubsub_relay::auth::AuthorizationGate;
use pubsub_relay::config::BrokerConfig;
use pubsub_relay::cors::cors_layer;
use pubsub_relay::domain::ClientRegistry;
use pubsub_relay::service::BrokerServer;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load configuration
    let config = BrokerConfig::from_env()?;

    // Initialize tracing
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    if config.json_logs {
        tracing_subscriber::fmt().json().with_env_filter(filter).init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }

    tracing::info!(addr = %config.listen_addr, "starting pubsub-relay");
    if config.publisher_secret.is_none() {
        tracing::warn!("PUBLISHER_JWT_SECRET is not set; all publishers will be allowed");
    }
    if config.subscriber_secret.is_none() {
        tracing::warn!(
            "SUBSCRIBER_JWT_SECRET is not set; subscribers may connect but are entitled to no topics"
        );
    }

    // Build domain and service layers
    let registry = Arc::new(ClientRegistry::new());
    let gate = AuthorizationGate::new(
        config.publisher_secret.clone(),
        config.subscriber_secret.clone(),
    );
    let broker = Arc::new(BrokerServer::new(gate, registry, config.keepalive));

    // Build router
    let cors = cors_layer(config.cors_allowed_origin.as_deref())?;
    let app = api::build_app(AppState { broker }, cors);

    // Start server
    let listener = tokio::net::TcpListener::bind(config.listen_addr).await?;
    tracing::info!(addr = %config.listen_addr, "server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("shutting down");
    Ok(())
}

/// Resolves on Ctrl-C or, on Unix, SIGTERM.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %err, "failed to listen for ctrl-c");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(err) => {
                tracing::error!(error = %err, "failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }
}
