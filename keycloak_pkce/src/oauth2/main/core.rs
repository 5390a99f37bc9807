use chrono::Utc;
use http::header::HeaderMap;
use url::Url;

use crate::oauth2::client::KeycloakClient;
use crate::oauth2::errors::OAuth2Error;
use crate::oauth2::types::{IdClaims, TokenResponse};
use crate::oauth2::{CODE_VERIFIER_COOKIE_NAME, OAUTH_STATE_COOKIE_NAME};
use crate::utils::{get_cookie, header_delete_cookie, header_set_cookie};

use super::idtoken::verify_idtoken;
use super::pkce::{generate_flow_state, state_matches};
use super::token::exchange_code_for_token;

/// Starts a login: returns the Keycloak authorization URL and the headers
/// that store the state token and code verifier on the user agent.
pub fn prepare_auth_request(client: &KeycloakClient) -> Result<(String, HeaderMap), OAuth2Error> {
    let config = client.config();
    let (flow, challenge) = generate_flow_state()?;

    tracing::debug!(
        "Generated PKCE code verifier (length {})",
        flow.code_verifier.len()
    );

    let auth_url = build_auth_url(client, &flow.state, &challenge)?;

    let mut headers = HeaderMap::new();
    header_set_cookie(
        &mut headers,
        OAUTH_STATE_COOKIE_NAME,
        &format!("{}.{}", flow.state, flow.issued_at),
        Some(config.flow_cookie_max_age),
        config.cookie_secure,
    )?;
    header_set_cookie(
        &mut headers,
        CODE_VERIFIER_COOKIE_NAME,
        &flow.code_verifier,
        Some(config.flow_cookie_max_age),
        config.cookie_secure,
    )?;

    tracing::info!("Redirecting to Keycloak authorization endpoint");
    Ok((auth_url, headers))
}

fn build_auth_url(
    client: &KeycloakClient,
    state: &str,
    code_challenge: &str,
) -> Result<String, OAuth2Error> {
    let config = client.config();
    let mut url =
        Url::parse(&config.auth_url()).map_err(|e| OAuth2Error::InvalidUrl(e.to_string()))?;
    url.query_pairs_mut()
        .append_pair("client_id", &config.client_id)
        .append_pair("redirect_uri", &config.redirect_uri)
        .append_pair("scope", &config.scope)
        .append_pair("response_type", "code")
        .append_pair("state", state)
        .append_pair("code_challenge", code_challenge)
        .append_pair("code_challenge_method", "S256");
    Ok(url.into())
}

/// Tolerated skew between instances issuing and checking the flow.
const CLOCK_SKEW_SECS: i64 = 5;

/// The `oauth_state` cookie holds `<state>.<issued_at>`.
fn parse_state_cookie(value: &str) -> Option<(&str, i64)> {
    let (state, issued_at) = value.rsplit_once('.')?;
    Some((state, issued_at.parse().ok()?))
}

/// Compares the `state` query parameter with the `oauth_state` cookie and
/// rejects flows older than the flow cookie lifetime.
pub(crate) fn csrf_checks(
    client: &KeycloakClient,
    state: &str,
    headers: &HeaderMap,
) -> Result<(), OAuth2Error> {
    let stored = get_cookie(headers, OAUTH_STATE_COOKIE_NAME);
    let parsed = stored.as_deref().and_then(parse_state_cookie);

    let Some((stored_state, issued_at)) = parsed else {
        tracing::warn!("State cookie missing or malformed");
        return Err(OAuth2Error::CsrfTokenMismatch);
    };
    if !state_matches(state, Some(stored_state)) {
        tracing::warn!("State mismatch");
        return Err(OAuth2Error::CsrfTokenMismatch);
    }

    let age = Utc::now().timestamp() - issued_at;
    if !(-CLOCK_SKEW_SECS..=client.config().flow_cookie_max_age).contains(&age) {
        tracing::warn!("Login flow started {}s ago, rejecting", age);
        return Err(OAuth2Error::FlowExpired);
    }
    Ok(())
}

pub(crate) fn get_code_verifier(headers: &HeaderMap) -> Result<String, OAuth2Error> {
    get_cookie(headers, CODE_VERIFIER_COOKIE_NAME).ok_or(OAuth2Error::MissingCodeVerifier)
}

/// Redeems the code and verifies the returned ID token.
pub(crate) async fn get_idinfo_from_code(
    client: &KeycloakClient,
    code: &str,
    code_verifier: &str,
) -> Result<(TokenResponse, IdClaims), OAuth2Error> {
    let token_response = exchange_code_for_token(client, code, code_verifier).await?;

    let id_token = token_response.id_token.as_deref().ok_or_else(|| {
        OAuth2Error::InvalidTokenResponse("id_token missing from token response".to_string())
    })?;
    let claims = verify_idtoken(client, id_token).await?;

    tracing::debug!(
        "ID token verified for subject {:?}",
        claims.get("sub").and_then(|v| v.as_str())
    );
    Ok((token_response, claims))
}

/// Expires both flow cookies.
pub(crate) fn delete_flow_cookies(
    headers: &mut HeaderMap,
    secure: bool,
) -> Result<(), OAuth2Error> {
    header_delete_cookie(headers, OAUTH_STATE_COOKIE_NAME, secure)?;
    header_delete_cookie(headers, CODE_VERIFIER_COOKIE_NAME, secure)?;
    Ok(())
}
