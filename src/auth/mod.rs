//! Authorization layer: bearer credential extraction and the role gate.
//!
//! Publishers and subscribers are authorized with independent HMAC-signed
//! JWT secrets. Either secret may be unset, which switches that role to
//! open mode (see [`AuthorizationGate`]).

pub mod gate;
pub mod token;

pub use gate::{AuthError, AuthorizationGate};
pub use token::extract_token;
