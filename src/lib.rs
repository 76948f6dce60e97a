//! # pubsub-relay
//!
//! Topic-based publish/subscribe relay over HTTP and WebSocket.
//!
//! Publishers `POST /publish` a `{topic, data}` pair; subscribers hold a
//! WebSocket open and receive the `data` of every message whose topic is
//! in their entitlement. Entitlements come from a signed JWT `topics`
//! claim and are fixed for the life of the connection.
//!
//! ## Architecture
//!
//! ```text
//! Clients (HTTP publishers, WebSocket subscribers)
//!     │
//!     ├── REST Handlers (api/)
//!     ├── WS Handler + connection loop (ws/)
//!     │
//!     ├── AuthorizationGate (auth/)
//!     ├── BrokerServer (service/)
//!     │
//!     └── ClientRegistry ── Connection (domain/)
//! ```
//!
//! Delivery is in-memory, best-effort, and at-most-once.

pub mod api;
pub mod app_state;
pub mod auth;
pub mod config;
pub mod cors;
pub mod domain;
pub mod error;
pub mod service;
pub mod ws;
