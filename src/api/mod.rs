//! HTTP surface: REST handlers, DTOs, OpenAPI document, and the full
//! application router.
//!
//! # Endpoints
//!
//! - `GET /` - Liveness probe
//! - `GET /health` - Health and live subscriber count
//! - `POST /publish` - Publish a message on a topic
//! - `GET /subscribe` - Subscriber WebSocket (also any unmatched path)
//! - `GET /api-docs/openapi.json` - OpenAPI document

pub mod dto;
pub mod handlers;

use axum::Router;
use axum::routing::get;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::app_state::AppState;
use crate::ws::handler::ws_handler;

/// OpenAPI document for the HTTP endpoints.
#[derive(Debug, OpenApi)]
#[openapi(
    info(
        title = "pubsub-relay",
        description = "Topic-based publish/subscribe relay. Subscribers connect over WebSocket at `/subscribe`."
    ),
    paths(
        handlers::system::root_handler,
        handlers::system::health_handler,
        handlers::publish::publish,
    ),
    components(schemas(
        dto::PublishRequest,
        dto::PublishResponse,
        crate::error::ErrorResponse,
        crate::error::ErrorBody,
    )),
    modifiers(&BearerAuth),
    tags(
        (name = "Publish", description = "Message publishing"),
        (name = "System", description = "Liveness and health"),
    )
)]
pub struct ApiDoc;

/// Registers the `bearer` JWT security scheme.
#[derive(Debug)]
struct BearerAuth;

impl Modify for BearerAuth {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            );
        }
    }
}

/// Builds the REST router (no WebSocket, no middleware).
pub fn build_router() -> Router<AppState> {
    handlers::routes()
}

/// Builds the complete application: REST routes, the subscriber
/// WebSocket, API docs, tracing, and CORS.
pub fn build_app(state: AppState, cors: CorsLayer) -> Router {
    let router = build_router()
        .route("/subscribe", get(ws_handler))
        .fallback(ws_handler);

    with_api_docs(router)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

#[cfg(feature = "swagger-ui")]
fn with_api_docs(router: Router<AppState>) -> Router<AppState> {
    router.merge(
        utoipa_swagger_ui::SwaggerUi::new("/swagger-ui")
            .url("/api-docs/openapi.json", ApiDoc::openapi()),
    )
}

#[cfg(not(feature = "swagger-ui"))]
fn with_api_docs(router: Router<AppState>) -> Router<AppState> {
    router.route(
        "/api-docs/openapi.json",
        get(|| async { axum::Json(ApiDoc::openapi()) }),
    )
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;

    #[test]
    fn openapi_lists_http_paths() {
        let doc = ApiDoc::openapi();
        assert!(doc.paths.paths.contains_key("/publish"));
        assert!(doc.paths.paths.contains_key("/health"));
        assert!(doc.paths.paths.contains_key("/"));
    }

    #[test]
    fn openapi_registers_bearer_scheme() {
        let doc = ApiDoc::openapi();
        let Some(components) = doc.components else {
            panic!("components missing");
        };
        assert!(components.security_schemes.contains_key("bearer"));
    }
}
