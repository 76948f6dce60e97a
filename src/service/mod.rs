//! Service layer: relay orchestration.
//!
//! The [`BrokerServer`] ties the authorization gate to the client registry
//! for both the subscribe handshake and the publish path.

pub mod broker;

pub use broker::BrokerServer;
