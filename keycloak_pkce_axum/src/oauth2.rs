use axum::{
    Router,
    extract::{Query, State, rejection::QueryRejection},
    http::{HeaderMap, StatusCode, header::LOCATION},
    response::{IntoResponse, Json, Response},
    routing::get,
};
use serde_json::Value;

use keycloak_pkce::{AuthResponse, KeycloakClient, authorize_core, callback_core};

use super::error::IntoResponseError;

pub(super) fn router() -> Router<KeycloakClient> {
    Router::new()
        .route("/auth", get(auth))
        .route("/callback", get(callback))
}

/// Redirects the browser to Keycloak with a fresh state and PKCE challenge.
async fn auth(
    State(client): State<KeycloakClient>,
) -> Result<Response, (StatusCode, Json<Value>)> {
    let (auth_url, headers) = authorize_core(&client).into_response_error()?;
    Ok(found(headers, auth_url))
}

/// Keycloak redirects here after sign-in. Always answers with a redirect to
/// the application home.
async fn callback(
    State(client): State<KeycloakClient>,
    query: Result<Query<AuthResponse>, QueryRejection>,
    headers: HeaderMap,
) -> Response {
    let auth_response = match query {
        Ok(Query(auth_response)) => auth_response,
        Err(e) => {
            tracing::warn!("Unparseable callback query: {}", e);
            AuthResponse::default()
        }
    };

    let (response_headers, location) = callback_core(&client, &auth_response, &headers).await;
    found(response_headers, location)
}

fn found(headers: HeaderMap, location: String) -> Response {
    (StatusCode::FOUND, headers, [(LOCATION, location)]).into_response()
}
