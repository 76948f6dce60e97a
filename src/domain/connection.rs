//! A live subscriber: its outbound transport and frozen topic entitlement.

use std::collections::HashSet;
use std::fmt;
use std::pin::Pin;

use axum::extract::ws::Message;
use chrono::{DateTime, Utc};
use futures_util::{Sink, SinkExt};
use tokio::sync::Mutex;

use super::ConnectionId;
use crate::error::BrokerError;

/// Write half of a subscriber transport.
///
/// In production this is the sink side of a split axum
/// [`WebSocket`](axum::extract::ws::WebSocket).
pub type Outbound = Pin<Box<dyn Sink<Message, Error = axum::Error> + Send>>;

/// A registered subscriber connection.
///
/// The topic set is fixed at construction. All writes to the transport,
/// whether broadcast deliveries or heartbeat replies, go through the
/// internal mutex so frames are never interleaved.
pub struct Connection {
    id: ConnectionId,
    topics: HashSet<String>,
    connected_at: DateTime<Utc>,
    outbound: Mutex<Outbound>,
}

impl Connection {
    /// Creates a connection entitled to `topics`, writing to `outbound`.
    #[must_use]
    pub fn new<I, S>(topics: I, outbound: Outbound) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            id: ConnectionId::new(),
            topics: topics.into_iter().map(Into::into).collect(),
            connected_at: Utc::now(),
            outbound: Mutex::new(outbound),
        }
    }

    /// Returns the connection identity.
    #[must_use]
    pub const fn id(&self) -> ConnectionId {
        self.id
    }

    /// Returns the entitled topics.
    #[must_use]
    pub const fn topics(&self) -> &HashSet<String> {
        &self.topics
    }

    /// Returns when the handshake completed.
    #[must_use]
    pub const fn connected_at(&self) -> DateTime<Utc> {
        self.connected_at
    }

    /// Returns `true` if `topic` is in the entitlement set (exact match).
    #[must_use]
    pub fn is_entitled(&self, topic: &str) -> bool {
        self.topics.contains(topic)
    }

    /// Delivers `payload` as a text frame if the connection is entitled to
    /// `topic`.
    ///
    /// Returns `Ok(false)` without touching the transport when the topic
    /// does not match.
    ///
    /// # Errors
    ///
    /// Returns [`BrokerError::TransportWrite`] if the frame cannot be written.
    pub async fn deliver(&self, topic: &str, payload: &str) -> Result<bool, BrokerError> {
        if !self.is_entitled(topic) {
            return Ok(false);
        }
        self.send_text(payload).await?;
        Ok(true)
    }

    /// Writes a text frame to the transport.
    ///
    /// # Errors
    ///
    /// Returns [`BrokerError::TransportWrite`] if the frame cannot be written.
    pub async fn send_text(&self, text: &str) -> Result<(), BrokerError> {
        self.send(Message::text(text)).await
    }

    /// Sends a close frame. The transport is not removed from any registry.
    ///
    /// # Errors
    ///
    /// Returns [`BrokerError::TransportWrite`] if the frame cannot be written.
    pub async fn close(&self) -> Result<(), BrokerError> {
        self.send(Message::Close(None)).await
    }

    async fn send(&self, message: Message) -> Result<(), BrokerError> {
        let mut outbound = self.outbound.lock().await;
        outbound
            .send(message)
            .await
            .map_err(BrokerError::TransportWrite)
    }
}

impl fmt::Debug for Connection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Connection")
            .field("id", &self.id)
            .field("topics", &self.topics)
            .field("connected_at", &self.connected_at)
            .finish_non_exhaustive()
    }
}
