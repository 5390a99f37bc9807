use axum::{
    Router,
    extract::State,
    http::{HeaderMap, StatusCode},
    response::Json,
    routing::get,
};
use serde_json::{Value, json};

use keycloak_pkce::{KeycloakClient, get_user_core, logout_core};

use super::error::IntoResponseError;

pub(super) fn router() -> Router<KeycloakClient> {
    Router::new().route("/user", get(get_user).delete(logout))
}

/// Returns the signed-in user's claims.
async fn get_user(headers: HeaderMap) -> Result<Json<Value>, (StatusCode, Json<Value>)> {
    let session = get_user_core(&headers).into_response_error()?;
    Ok(Json(json!({
        "user": session.user,
        "authenticated": true,
    })))
}

async fn logout(
    State(client): State<KeycloakClient>,
) -> Result<(HeaderMap, Json<Value>), (StatusCode, Json<Value>)> {
    let headers = logout_core(&client).into_response_error()?;
    Ok((
        headers,
        Json(json!({ "message": "Logged out successfully" })),
    ))
}
