//! Domain layer: connection identity, live connections, and the registry.
//!
//! This module contains the in-memory broadcast engine: each subscriber
//! is a [`Connection`] with a frozen topic entitlement, and the
//! [`ClientRegistry`] is the only shared mutable structure, fanning a
//! published message out to every entitled member.

pub mod client_registry;
pub mod connection;
pub mod connection_id;

pub use client_registry::ClientRegistry;
pub use connection::{Connection, Outbound};
pub use connection_id::ConnectionId;
