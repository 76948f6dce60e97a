//! Concurrent set of live subscriber connections.
//!
//! [`ClientRegistry`] stores every registered [`Connection`] keyed by its
//! [`ConnectionId`] behind a single [`tokio::sync::RwLock`]. Broadcasts
//! share the read side and may run in parallel; `add` and `remove` take
//! the write side and are serialized with each other and with any
//! broadcast in flight.

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use tokio::sync::RwLock;

use super::{Connection, ConnectionId};

/// Membership of all active subscriber connections.
///
/// # Concurrency
///
/// - Multiple broadcasts may traverse the set concurrently.
/// - Mutations wait for in-flight broadcasts and block new ones.
/// - A broadcast sees the membership as of the moment it took the lock.
#[derive(Debug, Default)]
pub struct ClientRegistry {
    members: RwLock<HashMap<ConnectionId, Arc<Connection>>>,
}

impl ClientRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a connection.
    ///
    /// Returns `false` if a connection with the same identity was already
    /// present, in which case membership is unchanged.
    pub async fn add(&self, connection: Arc<Connection>) -> bool {
        let mut members = self.members.write().await;
        let id = connection.id();
        if members.contains_key(&id) {
            return false;
        }
        members.insert(id, connection);
        true
    }

    /// Unregisters a connection.
    ///
    /// Returns `false` if it was not present. Repeated calls are no-ops.
    pub async fn remove(&self, id: ConnectionId) -> bool {
        self.members.write().await.remove(&id).is_some()
    }

    /// Delivers `payload` to every member entitled to `topic`.
    ///
    /// Writes happen one member at a time while the read lock is held. A
    /// failed write is logged and the traversal continues; the member stays
    /// registered until its own connection task removes it.
    pub async fn broadcast(&self, topic: &str, payload: &str) {
        let members = self.members.read().await;
        for connection in members.values() {
            match connection.deliver(topic, payload).await {
                Ok(true) => {
                    tracing::trace!(connection_id = %connection.id(), topic, "message delivered");
                }
                Ok(false) => {
                    tracing::trace!(connection_id = %connection.id(), topic, "not entitled, skipped");
                }
                Err(err) => {
                    tracing::warn!(
                        connection_id = %connection.id(),
                        topic,
                        error = %err,
                        "failed to deliver message"
                    );
                }
            }
        }
    }

    /// Returns the number of registered connections.
    pub async fn len(&self) -> usize {
        self.members.read().await.len()
    }

    /// Returns `true` if no connection is registered.
    pub async fn is_empty(&self) -> bool {
        self.members.read().await.is_empty()
    }

    /// Returns, per topic, how many registered connections are entitled to it.
    pub async fn topic_counts(&self) -> BTreeMap<String, usize> {
        let members = self.members.read().await;
        let mut counts = BTreeMap::new();
        for topic in members.values().flat_map(|c| c.topics()) {
            *counts.entry(topic.clone()).or_insert(0) += 1;
        }
        counts
    }
}
