//! Relay configuration loaded from environment variables.
//!
//! Follows 12-factor style: all settings come from environment variables
//! (or a `.env` file via `dotenvy`) and are read once at startup.

use std::net::SocketAddr;
use std::time::Duration;

/// Default idle keepalive, in minutes, for subscriber connections.
const DEFAULT_KEEPALIVE_MINUTES: u64 = 10;

/// Top-level relay configuration.
///
/// Loaded once at startup via [`BrokerConfig::from_env`].
#[derive(Clone)]
pub struct BrokerConfig {
    /// Socket address to bind the HTTP server to (e.g. `0.0.0.0:1506`).
    pub listen_addr: SocketAddr,

    /// HMAC secret for publisher tokens. `None` allows every publisher.
    pub publisher_secret: Option<String>,

    /// HMAC secret for subscriber tokens. `None` grants every subscriber
    /// an empty topic entitlement.
    pub subscriber_secret: Option<String>,

    /// Fixed CORS origin. `None` reflects the request's `Origin` header.
    pub cors_allowed_origin: Option<String>,

    /// A subscriber that sends nothing for this long is disconnected.
    pub keepalive: Duration,

    /// Emit logs as JSON lines instead of human-readable text.
    pub json_logs: bool,
}

impl BrokerConfig {
    /// Loads configuration from environment variables.
    ///
    /// | Variable                | Default        |
    /// |-------------------------|----------------|
    /// | `LISTEN_ADDR`           | `0.0.0.0:1506` |
    /// | `PUBLISHER_JWT_SECRET`  | unset (open)   |
    /// | `SUBSCRIBER_JWT_SECRET` | unset (no topics) |
    /// | `CORS_ALLOWED_ORIGINS`  | unset (reflect)|
    /// | `KEEPALIVE_TIMEOUT`     | `10` (minutes, `0` = default) |
    /// | `LOG_FORMAT`            | `text`         |
    ///
    /// Calls `dotenvy::dotenv().ok()` to optionally load a `.env` file.
    ///
    /// # Errors
    ///
    /// Returns an error if `LISTEN_ADDR` is set but cannot be parsed as
    /// a [`SocketAddr`].
    pub fn from_env() -> Result<Self, Box<dyn std::error::Error>> {
        dotenvy::dotenv().ok();

        let listen_addr: SocketAddr = std::env::var("LISTEN_ADDR")
            .unwrap_or_else(|_| "0.0.0.0:1506".to_string())
            .parse()?;

        let publisher_secret = non_empty_env("PUBLISHER_JWT_SECRET");
        let subscriber_secret = non_empty_env("SUBSCRIBER_JWT_SECRET");
        let cors_allowed_origin =
            non_empty_env("CORS_ALLOWED_ORIGINS").filter(|origin| origin != "*");

        let keepalive_minutes = match parse_env("KEEPALIVE_TIMEOUT", DEFAULT_KEEPALIVE_MINUTES) {
            0 => DEFAULT_KEEPALIVE_MINUTES,
            minutes => minutes,
        };
        let keepalive = Duration::from_secs(keepalive_minutes.saturating_mul(60));

        let json_logs = std::env::var("LOG_FORMAT")
            .map(|v| v.eq_ignore_ascii_case("json"))
            .unwrap_or(false);

        Ok(Self {
            listen_addr,
            publisher_secret,
            subscriber_secret,
            cors_allowed_origin,
            keepalive,
            json_logs,
        })
    }
}

impl std::fmt::Debug for BrokerConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BrokerConfig")
            .field("listen_addr", &self.listen_addr)
            .field("publisher_secret", &self.publisher_secret.as_ref().map(|_| "***"))
            .field("subscriber_secret", &self.subscriber_secret.as_ref().map(|_| "***"))
            .field("cors_allowed_origin", &self.cors_allowed_origin)
            .field("keepalive", &self.keepalive)
            .field("json_logs", &self.json_logs)
            .finish()
    }
}

/// Parses an environment variable as `T`, returning `default` on missing
/// or invalid values.
fn parse_env<T: std::str::FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|v| v.trim().parse().ok())
        .unwrap_or(default)
}

/// Reads an environment variable, treating an empty value as unset.
fn non_empty_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.is_empty())
}
