use http::HeaderMap;

use crate::oauth2::KeycloakClient;
use crate::session::{Session, get_session, prepare_logout_response};

use super::errors::CoordinationError;

/// Returns the session carried by the request cookies.
pub fn get_user_core(headers: &HeaderMap) -> Result<Session, CoordinationError> {
    Ok(get_session(headers)?)
}

/// Returns headers that expire the session cookies. Idempotent.
#[tracing::instrument(skip_all)]
pub fn logout_core(client: &KeycloakClient) -> Result<HeaderMap, CoordinationError> {
    let headers = prepare_logout_response(client.config().cookie_secure)?;
    tracing::info!("Session cookies cleared");
    Ok(headers)
}
