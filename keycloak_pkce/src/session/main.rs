use http::header::HeaderMap;
use serde_json::Value;

use crate::oauth2::{IdClaims, TokenResponse};
use crate::utils::{get_cookie, header_delete_cookie, header_set_cookie};

use super::errors::SessionError;
use super::types::Session;
use super::{ACCESS_TOKEN_COOKIE_NAME, DEFAULT_SESSION_MAX_AGE, USER_INFO_COOKIE_NAME};

/// Reads the session from the request cookies.
///
/// # Returns
/// * `Err(SessionError::NotAuthenticated)` - either session cookie is missing or empty
/// * `Err(SessionError::InvalidUserData)` - `user_info` is not a percent-encoded JSON object
pub fn get_session(headers: &HeaderMap) -> Result<Session, SessionError> {
    let access_token = get_cookie(headers, ACCESS_TOKEN_COOKIE_NAME);
    let user_info = get_cookie(headers, USER_INFO_COOKIE_NAME);

    let (Some(access_token), Some(user_info)) = (access_token, user_info) else {
        return Err(SessionError::NotAuthenticated);
    };

    let user = decode_user_info(&user_info)?;
    Ok(Session { access_token, user })
}

fn decode_user_info(raw: &str) -> Result<IdClaims, SessionError> {
    let decoded =
        urlencoding::decode(raw).map_err(|e| SessionError::InvalidUserData(e.to_string()))?;
    match serde_json::from_str::<Value>(&decoded) {
        Ok(Value::Object(claims)) => Ok(claims),
        Ok(_) => Err(SessionError::InvalidUserData(
            "user_info is not a JSON object".to_string(),
        )),
        Err(e) => Err(SessionError::InvalidUserData(e.to_string())),
    }
}

/// Appends the `access_token` and `user_info` cookies for a completed login.
///
/// Both expire after `expires_in` seconds, or `DEFAULT_SESSION_MAX_AGE` when
/// Keycloak did not send one.
pub(crate) fn prepare_session_headers(
    headers: &mut HeaderMap,
    token_response: &TokenResponse,
    claims: &IdClaims,
    secure: bool,
) -> Result<(), SessionError> {
    let max_age = token_response
        .expires_in
        .filter(|secs| *secs > 0)
        .unwrap_or(DEFAULT_SESSION_MAX_AGE);

    let user_json = serde_json::to_string(claims)
        .map_err(|e| SessionError::InvalidUserData(e.to_string()))?;
    let user_info = urlencoding::encode(&user_json);

    header_set_cookie(
        headers,
        ACCESS_TOKEN_COOKIE_NAME,
        &token_response.access_token,
        Some(max_age),
        secure,
    )?;
    header_set_cookie(headers, USER_INFO_COOKIE_NAME, &user_info, Some(max_age), secure)?;

    tracing::debug!("Session cookies issued with Max-Age={}", max_age);
    Ok(())
}

/// Prepare a logout response by expiring both session cookies.
///
/// Safe to call without a session.
pub fn prepare_logout_response(secure: bool) -> Result<HeaderMap, SessionError> {
    let mut headers = HeaderMap::new();
    header_delete_cookie(&mut headers, ACCESS_TOKEN_COOKIE_NAME, secure)?;
    header_delete_cookie(&mut headers, USER_INFO_COOKIE_NAME, secure)?;
    Ok(headers)
}
