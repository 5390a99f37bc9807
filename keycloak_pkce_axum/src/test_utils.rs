//! Shared helpers for the handler tests

use axum::body::{Body, to_bytes};
use axum::response::Response;
use http::header::SET_COOKIE;
use serde_json::Value;

use keycloak_pkce::{KeycloakClient, KeycloakConfig};

/// A client whose back channel points at a closed port.
pub fn test_client(home: &str) -> KeycloakClient {
    let config = KeycloakConfig::from_lookup(|name| {
        let value = match name {
            "KEYCLOAK_ISSUER_URL" => "http://localhost:8080/realms/one-account-realm",
            "KEYCLOAK_INTERNAL_URL" => "http://127.0.0.1:9/realms/one-account-realm",
            "KEYCLOAK_CLIENT_ID" => "gmo-coin-client",
            "KEYCLOAK_CLIENT_SECRET" => "s3cret",
            "APP_HOME_URL" => home,
            _ => return None,
        };
        Some(value.to_string())
    })
    .unwrap();
    KeycloakClient::new(config).unwrap()
}

pub fn set_cookies(response: &Response) -> Vec<String> {
    response
        .headers()
        .get_all(SET_COOKIE)
        .iter()
        .map(|v| v.to_str().unwrap().to_string())
        .collect()
}

pub async fn json_body(response: Response<Body>) -> Value {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}
