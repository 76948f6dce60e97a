//! Request and response DTOs for the publish endpoint.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Request body for `POST /publish`.
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct PublishRequest {
    /// Topic to route the message to. Matched exactly against subscriber
    /// entitlements.
    pub topic: String,
    /// Payload forwarded verbatim as a WebSocket text frame.
    pub data: String,
}

/// Response body for a successful publish.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct PublishResponse {
    /// Always `"published"`.
    pub message: String,
    /// Topic the message was broadcast on.
    pub topic: String,
}
