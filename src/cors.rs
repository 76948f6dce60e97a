//! CORS policy for browser publishers and subscribers.

use axum::http::header::{ACCEPT, AUTHORIZATION, CONTENT_TYPE, InvalidHeaderValue};
use axum::http::{HeaderName, HeaderValue, Method};
use tower_http::cors::{AllowOrigin, CorsLayer};

/// Builds the CORS layer.
///
/// With no fixed origin the request's `Origin` is reflected back, which
/// keeps credentialed requests working from any site. Preflight requests
/// are answered by the layer itself.
///
/// # Errors
///
/// Returns [`InvalidHeaderValue`] if `allowed_origin` is not a valid
/// header value.
pub fn cors_layer(allowed_origin: Option<&str>) -> Result<CorsLayer, InvalidHeaderValue> {
    let origin = match allowed_origin {
        None | Some("" | "*") => AllowOrigin::mirror_request(),
        Some(origin) => AllowOrigin::exact(HeaderValue::from_str(origin)?),
    };

    Ok(CorsLayer::new()
        .allow_origin(origin)
        .allow_credentials(true)
        .allow_methods([
            Method::GET,
            Method::PATCH,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([
            AUTHORIZATION,
            CONTENT_TYPE,
            HeaderName::from_static("baggage"),
            ACCEPT,
            HeaderName::from_static("sentry-trace"),
        ])
        .expose_headers([AUTHORIZATION, CONTENT_TYPE]))
}
