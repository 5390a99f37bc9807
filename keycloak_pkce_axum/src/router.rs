//! Router for the Keycloak login endpoints

use axum::Router;
use tower_http::LatencyUnit;
use tower_http::trace::{DefaultMakeSpan, DefaultOnRequest, DefaultOnResponse, TraceLayer};
use tracing::Level;

use keycloak_pkce::KeycloakClient;

/// Create a router for the login endpoints
///
/// Mount it at `KEYCLOAK_ROUTE_PREFIX`. The endpoints will be available at:
/// - {KEYCLOAK_ROUTE_PREFIX}/auth
/// - {KEYCLOAK_ROUTE_PREFIX}/callback
/// - {KEYCLOAK_ROUTE_PREFIX}/user (GET and DELETE)
pub fn keycloak_router(client: KeycloakClient) -> Router {
    keycloak_router_no_trace(client).layer(
        TraceLayer::new_for_http()
            .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
            .on_request(DefaultOnRequest::new().level(Level::INFO))
            .on_response(
                DefaultOnResponse::new()
                    .level(Level::INFO)
                    .latency_unit(LatencyUnit::Millis),
            ),
    )
}

/// Same as `keycloak_router()` but without the HTTP tracing middleware.
pub fn keycloak_router_no_trace(client: KeycloakClient) -> Router {
    Router::new()
        .merge(super::oauth2::router())
        .merge(super::user::router())
        .with_state(client)
}
