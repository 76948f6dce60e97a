//! Subscriber connection lifecycle.
//!
//! Once the WebSocket upgrade completes, [`run_connection`] registers the
//! subscriber, answers heartbeats until the transport closes or goes idle,
//! and then unregisters it exactly once.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use axum::extract::ws::{Message, WebSocket};
use chrono::Utc;
use futures_util::{Stream, StreamExt};

use super::heartbeat;
use crate::domain::{ClientRegistry, Connection};
use crate::error::BrokerError;

/// Why an active subscriber connection ended.
#[derive(Debug)]
pub enum CloseReason {
    /// The peer sent a close frame or the stream ended.
    PeerClosed,
    /// Nothing arrived from the peer within the keepalive window.
    IdleTimeout,
    /// Reading from or writing to the transport failed.
    Transport(String),
}

impl fmt::Display for CloseReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::PeerClosed => write!(f, "peer closed"),
            Self::IdleTimeout => write!(f, "idle timeout"),
            Self::Transport(err) => write!(f, "transport error: {err}"),
        }
    }
}

/// Drives an upgraded socket from registration to removal.
pub async fn run_connection(
    socket: WebSocket,
    topics: Vec<String>,
    registry: Arc<ClientRegistry>,
    keepalive: Duration,
) {
    let (ws_tx, ws_rx) = socket.split();
    let joined = topics.join(", ");
    let connection = Arc::new(Connection::new(topics, Box::pin(ws_tx)));

    registry.add(Arc::clone(&connection)).await;
    tracing::info!(connection_id = %connection.id(), topics = %joined, "subscriber connected");

    let reason = serve_connection(&connection, ws_rx, keepalive).await;

    registry.remove(connection.id()).await;
    let connected_secs = (Utc::now() - connection.connected_at()).num_seconds();
    match &reason {
        CloseReason::Transport(_) => {
            tracing::warn!(connection_id = %connection.id(), %reason, connected_secs, "subscriber disconnected");
        }
        CloseReason::PeerClosed | CloseReason::IdleTimeout => {
            tracing::info!(connection_id = %connection.id(), %reason, connected_secs, "subscriber disconnected");
        }
    }
}

/// Reads inbound frames for a registered connection until it ends.
///
/// Any inbound frame resets the idle timer. A close frame is sent on a
/// best-effort basis on idle timeout and in reply to the peer's close.
/// Registry membership is left to the caller.
pub async fn serve_connection<S>(
    connection: &Connection,
    mut inbound: S,
    keepalive: Duration,
) -> CloseReason
where
    S: Stream<Item = Result<Message, axum::Error>> + Unpin,
{
    loop {
        let Ok(next) = tokio::time::timeout(keepalive, inbound.next()).await else {
            if let Err(err) = connection.close().await {
                tracing::debug!(connection_id = %connection.id(), error = %err, "close frame not sent");
            }
            return CloseReason::IdleTimeout;
        };

        match next {
            Some(Ok(Message::Text(text))) => {
                if let Err(err) = handle_text(connection, text.as_str()).await {
                    return CloseReason::Transport(err.to_string());
                }
            }
            Some(Ok(Message::Close(_))) => {
                // Flushes the close reply before the socket is dropped.
                if let Err(err) = connection.close().await {
                    tracing::debug!(connection_id = %connection.id(), error = %err, "close reply not sent");
                }
                return CloseReason::PeerClosed;
            }
            None => return CloseReason::PeerClosed,
            // Binary and control frames only count as activity.
            Some(Ok(_)) => {}
            Some(Err(err)) => return CloseReason::Transport(err.to_string()),
        }
    }
}

async fn handle_text(connection: &Connection, text: &str) -> Result<(), BrokerError> {
    match heartbeat::reply_to(text) {
        Some(reply) => connection.send_text(reply).await,
        None => {
            tracing::warn!(
                connection_id = %connection.id(),
                text,
                "unsupported message from subscriber"
            );
            Ok(())
        }
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use futures_util::stream;

    use super::*;
    use crate::domain::connection::test_support::{broken_outbound, channel_outbound, drain_text};

    const LONG: Duration = Duration::from_secs(60);

    fn frames(
        messages: Vec<Result<Message, axum::Error>>,
    ) -> stream::Iter<std::vec::IntoIter<Result<Message, axum::Error>>> {
        stream::iter(messages)
    }

    #[tokio::test]
    async fn ping_is_answered_with_pong() {
        let (outbound, mut rx) = channel_outbound();
        let conn = Connection::new(["a"], outbound);
        let inbound = frames(vec![Ok(Message::text("PING")), Ok(Message::text("PING"))]);

        let reason = serve_connection(&conn, inbound, LONG).await;

        assert!(matches!(reason, CloseReason::PeerClosed));
        assert_eq!(drain_text(&mut rx), vec!["PONG".to_string(), "PONG".to_string()]);
    }

    #[tokio::test]
    async fn other_text_is_ignored() {
        let (outbound, mut rx) = channel_outbound();
        let conn = Connection::new(["a"], outbound);
        let inbound = frames(vec![
            Ok(Message::text("hello")),
            Ok(Message::Binary(vec![1, 2, 3].into())),
            Ok(Message::text("PING")),
        ]);

        let _ = serve_connection(&conn, inbound, LONG).await;

        assert_eq!(drain_text(&mut rx), vec!["PONG".to_string()]);
    }

    #[tokio::test]
    async fn close_frame_ends_connection() {
        let (outbound, mut rx) = channel_outbound();
        let conn = Connection::new(["a"], outbound);
        let inbound = frames(vec![Ok(Message::Close(None)), Ok(Message::text("PING"))]);

        let reason = serve_connection(&conn, inbound, LONG).await;

        assert!(matches!(reason, CloseReason::PeerClosed));
        let Ok(Message::Close(None)) = rx.try_recv() else {
            panic!("expected a close reply");
        };
        assert!(drain_text(&mut rx).is_empty());
    }

    #[tokio::test]
    async fn peer_close_is_clean_even_if_reply_fails() {
        let conn = Connection::new(["a"], broken_outbound());
        let inbound = frames(vec![Ok(Message::Close(None))]);

        let reason = serve_connection(&conn, inbound, LONG).await;

        assert!(matches!(reason, CloseReason::PeerClosed));
    }

    #[tokio::test]
    async fn stream_end_sends_nothing() {
        let (outbound, mut rx) = channel_outbound();
        let conn = Connection::new(["a"], outbound);

        let reason = serve_connection(&conn, frames(vec![]), LONG).await;

        assert!(matches!(reason, CloseReason::PeerClosed));
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn read_error_ends_connection() {
        let (outbound, _rx) = channel_outbound();
        let conn = Connection::new(["a"], outbound);
        let err = axum::Error::new(std::io::Error::other("reset"));
        let inbound = frames(vec![Err(err)]);

        let reason = serve_connection(&conn, inbound, LONG).await;

        assert!(matches!(reason, CloseReason::Transport(_)));
    }

    #[tokio::test]
    async fn failed_pong_ends_connection() {
        let conn = Connection::new(["a"], broken_outbound());
        let inbound = frames(vec![Ok(Message::text("PING"))]);

        let reason = serve_connection(&conn, inbound, LONG).await;

        assert!(matches!(reason, CloseReason::Transport(_)));
    }

    #[tokio::test]
    async fn idle_connection_times_out_with_close_frame() {
        let (outbound, mut rx) = channel_outbound();
        let conn = Connection::new(["a"], outbound);
        let inbound = stream::pending::<Result<Message, axum::Error>>();

        let reason = serve_connection(&conn, inbound, Duration::from_millis(50)).await;

        assert!(matches!(reason, CloseReason::IdleTimeout));
        let Ok(Message::Close(None)) = rx.try_recv() else {
            panic!("expected a close frame");
        };
    }

    #[test]
    fn close_reason_display() {
        assert_eq!(CloseReason::PeerClosed.to_string(), "peer closed");
        assert_eq!(CloseReason::IdleTimeout.to_string(), "idle timeout");
        assert!(
            CloseReason::Transport("boom".to_string())
                .to_string()
                .contains("boom")
        );
    }
}
