//! Shared application state injected into all Axum handlers.

use std::sync::Arc;

use crate::service::BrokerServer;

/// Shared application state available to all handlers via Axum's
/// `State` extractor.
#[derive(Debug, Clone)]
pub struct AppState {
    /// Broker service owning the gate and the client registry.
    pub broker: Arc<BrokerServer>,
}
