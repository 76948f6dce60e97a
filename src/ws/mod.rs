//! WebSocket layer: subscribe endpoint, connection lifecycle, heartbeat.
//!
//! Subscribers connect on `/subscribe` (or any path the router does not
//! otherwise serve). Topics are resolved from the credential before the
//! upgrade and stay fixed for the life of the connection.

pub mod connection;
pub mod handler;
pub mod heartbeat;
