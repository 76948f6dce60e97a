//! Application-level heartbeat spoken over subscriber connections.
//!
//! A subscriber may send the literal text `PING` at any time and gets the
//! literal text `PONG` back. Nothing else a subscriber sends has meaning.

/// Text frame a subscriber sends to probe liveness.
pub const PING: &str = "PING";

/// Text frame sent back in response to [`PING`].
pub const PONG: &str = "PONG";

/// Returns the reply owed for an inbound text frame, if any.
#[must_use]
pub fn reply_to(text: &str) -> Option<&'static str> {
    (text == PING).then_some(PONG)
}
