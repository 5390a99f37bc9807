use askama::Template;
use axum::{
    Json,
    extract::{Query, State},
    http::StatusCode,
    response::Html,
};
use axum_extra::{TypedHeader, headers};
use serde::Deserialize;
use serde_json::{Value, json};

use keycloak_pkce_axum::{ACCESS_TOKEN_COOKIE_NAME, KEYCLOAK_ROUTE_PREFIX, KeycloakUser};

use crate::AppState;

#[derive(Template)]
#[template(path = "index.j2", escape = "html")]
struct IndexTemplate<'a> {
    message: &'a str,
    banner: Option<&'a str>,
    error: Option<&'a str>,
    authenticated: bool,
    auth_route_prefix: &'a str,
}

#[derive(Template)]
#[template(path = "protected.j2", escape = "html")]
struct ProtectedTemplate<'a> {
    user: KeycloakUser,
    claims: String,
    auth_route_prefix: &'a str,
}

/// Outcome parameters appended by the login callback.
#[derive(Debug, Deserialize)]
pub(crate) struct IndexQuery {
    login: Option<String>,
    error: Option<String>,
}

pub(crate) async fn index(
    user: Option<KeycloakUser>,
    Query(query): Query<IndexQuery>,
) -> Result<Html<String>, (StatusCode, String)> {
    let message = match &user {
        Some(u) => format!("Hey {}!", u.display_name()),
        None => "Click the Login link below.".to_string(),
    };
    let banner = (query.login.as_deref() == Some("success")).then_some("Signed in successfully.");

    let template = IndexTemplate {
        message: &message,
        banner,
        error: query.error.as_deref(),
        authenticated: user.is_some(),
        auth_route_prefix: KEYCLOAK_ROUTE_PREFIX.as_str(),
    };
    let html = Html(
        template
            .render()
            .map_err(|e| (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()))?,
    );
    Ok(html)
}

pub(crate) async fn protected(user: KeycloakUser) -> Result<Html<String>, (StatusCode, String)> {
    tracing::trace!("Rendering protected page for {}", user.id);
    let claims = serde_json::to_string_pretty(&user.claims)
        .map_err(|e| (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()))?;
    let template = ProtectedTemplate {
        user,
        claims,
        auth_route_prefix: KEYCLOAK_ROUTE_PREFIX.as_str(),
    };
    let html = Html(
        template
            .render()
            .map_err(|e| (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()))?,
    );
    Ok(html)
}

/// Calls the backend API with the session's access token as a bearer token.
pub(crate) async fn backend_user(
    State(state): State<AppState>,
    cookies: Option<TypedHeader<headers::Cookie>>,
) -> Result<Json<Value>, (StatusCode, Json<Value>)> {
    let token = cookies
        .as_ref()
        .and_then(|TypedHeader(cookies)| cookies.get(ACCESS_TOKEN_COOKIE_NAME))
        .filter(|token| !token.is_empty())
        .ok_or_else(|| {
            (
                StatusCode::UNAUTHORIZED,
                Json(json!({ "error": "Not authenticated" })),
            )
        })?;

    let bad_gateway = |e: reqwest::Error| {
        tracing::error!("Backend request failed: {}", e);
        (
            StatusCode::BAD_GATEWAY,
            Json(json!({ "error": "Backend unavailable" })),
        )
    };

    let response = state
        .http
        .get(&state.backend_url)
        .bearer_auth(token)
        .send()
        .await
        .map_err(bad_gateway)?;

    let status = response.status();
    let body: Value = response.json().await.map_err(bad_gateway)?;
    if !status.is_success() {
        tracing::debug!("Backend answered {}", status);
        return Err((status, Json(body)));
    }
    Ok(Json(body))
}
