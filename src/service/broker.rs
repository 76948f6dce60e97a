//! Broker service: subscriber handshake and publish orchestration.

use std::sync::Arc;
use std::time::Duration;

use axum::extract::ws::WebSocketUpgrade;
use axum::extract::ws::rejection::WebSocketUpgradeRejection;
use axum::response::Response;

use crate::auth::AuthorizationGate;
use crate::domain::ClientRegistry;
use crate::error::BrokerError;
use crate::ws::connection::run_connection;

/// Orchestration layer for both relay paths.
///
/// Owns the [`AuthorizationGate`] and an explicitly injected
/// [`ClientRegistry`]. The subscribe path is authorize → upgrade →
/// register; the publish path is [`authorize_publish`](Self::authorize_publish)
/// → [`broadcast`](Self::broadcast). Denials and verification failures
/// short-circuit before the registry is touched.
#[derive(Debug)]
pub struct BrokerServer {
    gate: AuthorizationGate,
    registry: Arc<ClientRegistry>,
    keepalive: Duration,
}

impl BrokerServer {
    /// Creates a new `BrokerServer`.
    #[must_use]
    pub fn new(gate: AuthorizationGate, registry: Arc<ClientRegistry>, keepalive: Duration) -> Self {
        Self {
            gate,
            registry,
            keepalive,
        }
    }

    /// Returns a reference to the inner [`ClientRegistry`].
    #[must_use]
    pub fn registry(&self) -> &Arc<ClientRegistry> {
        &self.registry
    }

    /// Returns a reference to the inner [`AuthorizationGate`].
    #[must_use]
    pub fn gate(&self) -> &AuthorizationGate {
        &self.gate
    }

    /// Resolves the topics a subscriber token is entitled to.
    ///
    /// An absent entitlement is flattened to an empty list; a subscriber
    /// with no topics may still connect.
    ///
    /// # Errors
    ///
    /// Returns [`BrokerError::Verification`] if the token cannot be verified.
    pub fn entitlement(&self, token: &str) -> Result<Vec<String>, BrokerError> {
        Ok(self.gate.authorize_subscriber(token)?.unwrap_or_default())
    }

    /// Performs the subscriber handshake.
    ///
    /// Authorization runs before the upgrade is inspected, so a forged
    /// credential fails the request even when it is not a WebSocket
    /// request. On success the returned response completes the upgrade and
    /// the connection is registered before its first frame is read.
    ///
    /// # Errors
    ///
    /// Returns [`BrokerError::Verification`] if the token cannot be verified,
    /// or [`BrokerError::Upgrade`] if the request is not a valid upgrade.
    pub fn handshake(
        &self,
        upgrade: Result<WebSocketUpgrade, WebSocketUpgradeRejection>,
        token: &str,
    ) -> Result<Response, BrokerError> {
        let topics = self.entitlement(token)?;
        let upgrade = upgrade?;

        tracing::debug!(topics = ?topics, "subscriber authorized, upgrading");

        let registry = Arc::clone(&self.registry);
        let keepalive = self.keepalive;
        Ok(upgrade
            .on_failed_upgrade(|err: axum::Error| {
                tracing::warn!(error = %err, "websocket upgrade failed");
            })
            .on_upgrade(move |socket| run_connection(socket, topics, registry, keepalive)))
    }

    /// Checks that `token` may publish.
    ///
    /// # Errors
    ///
    /// Returns [`BrokerError::Unauthorized`] on denial, or
    /// [`BrokerError::Verification`] if the token cannot be verified.
    pub fn authorize_publish(&self, token: &str) -> Result<(), BrokerError> {
        if self.gate.authorize_publisher(token)? {
            Ok(())
        } else {
            Err(BrokerError::Unauthorized)
        }
    }

    /// Fans `data` out to every subscriber entitled to `topic`.
    ///
    /// Delivery is best-effort; per-subscriber failures are logged by the
    /// registry and never reach the caller.
    pub async fn broadcast(&self, topic: &str, data: &str) {
        tracing::debug!(topic, bytes = data.len(), "publishing message");
        self.registry.broadcast(topic, data).await;
    }
}
