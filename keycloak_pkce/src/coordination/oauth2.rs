use http::HeaderMap;
use http::header::SET_COOKIE;

use crate::oauth2::{
    AuthResponse, KeycloakClient, csrf_checks, delete_flow_cookies, get_code_verifier,
    get_idinfo_from_code, prepare_auth_request,
};
use crate::session::prepare_session_headers;

use super::errors::CoordinationError;

/// Builds the redirect to the Keycloak authorization endpoint.
///
/// # Returns
/// The authorization URL and the headers carrying the `oauth_state` and
/// `code_verifier` cookies.
#[tracing::instrument(skip_all)]
pub fn authorize_core(client: &KeycloakClient) -> Result<(String, HeaderMap), CoordinationError> {
    Ok(prepare_auth_request(client)?)
}

/// Completes the login started by [`authorize_core`].
///
/// Never fails: every outcome is a redirect to the application home with
/// either `login=success` or `error=<code>`, together with the cookie changes
/// for that outcome.
#[tracing::instrument(skip_all)]
pub async fn callback_core(
    client: &KeycloakClient,
    auth_response: &AuthResponse,
    headers: &HeaderMap,
) -> (HeaderMap, String) {
    let home = client.config().app_home_url.as_str();

    let code = match validate_callback(client, auth_response, headers) {
        Ok(code) => code,
        Err(e) => {
            return (
                HeaderMap::new(),
                redirect_to(home, "error", &e.callback_error_code()),
            );
        }
    };

    // The state has been consumed. Flow cookies go away whatever happens next.
    let mut response_headers = HeaderMap::new();
    if let Err(e) = delete_flow_cookies(&mut response_headers, client.config().cookie_secure) {
        let e = CoordinationError::from(e);
        return (
            HeaderMap::new(),
            redirect_to(home, "error", &e.callback_error_code()),
        );
    }

    match complete_login(client, code, headers).await {
        Ok(session_headers) => {
            for value in session_headers.get_all(SET_COOKIE) {
                response_headers.append(SET_COOKIE, value.clone());
            }
            tracing::info!("Login completed");
            (response_headers, redirect_to(home, "login", "success"))
        }
        Err(e) => (
            response_headers,
            redirect_to(home, "error", &e.callback_error_code()),
        ),
    }
}

/// Checks performed before the flow state is consumed. Returns the code.
fn validate_callback<'a>(
    client: &KeycloakClient,
    auth_response: &'a AuthResponse,
    headers: &HeaderMap,
) -> Result<&'a str, CoordinationError> {
    if let Some(error) = non_empty(&auth_response.error) {
        tracing::warn!(
            "Keycloak returned error {}: {:?}",
            error,
            auth_response.error_description
        );
        return Err(CoordinationError::ProviderError(error.to_string()));
    }

    let (Some(code), Some(state)) = (
        non_empty(&auth_response.code),
        non_empty(&auth_response.state),
    ) else {
        tracing::warn!("Callback without code or state");
        return Err(CoordinationError::MissingParameters);
    };

    csrf_checks(client, state, headers)?;
    Ok(code)
}

async fn complete_login(
    client: &KeycloakClient,
    code: &str,
    headers: &HeaderMap,
) -> Result<HeaderMap, CoordinationError> {
    let code_verifier = get_code_verifier(headers)?;
    let (token_response, claims) = get_idinfo_from_code(client, code, &code_verifier).await?;

    let mut session_headers = HeaderMap::new();
    prepare_session_headers(
        &mut session_headers,
        &token_response,
        &claims,
        client.config().cookie_secure,
    )?;
    Ok(session_headers)
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|v| !v.is_empty())
}

fn redirect_to(home: &str, key: &str, value: &str) -> String {
    let separator = if home.contains('?') { '&' } else { '?' };
    format!("{home}{separator}{key}={}", urlencoding::encode(value))
}
