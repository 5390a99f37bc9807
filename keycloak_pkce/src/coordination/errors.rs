use thiserror::Error;

use crate::oauth2::OAuth2Error;
use crate::session::SessionError;
use crate::utils::UtilError;

/// Errors that can occur while coordinating the login flow
#[derive(Error, Debug)]
pub enum CoordinationError {
    /// Keycloak redirected back with an `error` parameter
    #[error("Provider error: {0}")]
    ProviderError(String),

    /// `code` or `state` missing from the callback
    #[error("Missing code or state parameter")]
    MissingParameters,

    #[error("OAuth2 error: {0}")]
    OAuth2Error(OAuth2Error),

    #[error("Session error: {0}")]
    SessionError(SessionError),

    #[error("Utils error: {0}")]
    UtilsError(UtilError),
}

impl CoordinationError {
    /// The value placed in the `error` query parameter of the callback redirect.
    pub fn callback_error_code(&self) -> String {
        match self {
            Self::ProviderError(code) => code.clone(),
            Self::MissingParameters => "missing_parameters".to_string(),
            Self::OAuth2Error(OAuth2Error::CsrfTokenMismatch | OAuth2Error::FlowExpired) => {
                "invalid_state".to_string()
            }
            Self::OAuth2Error(OAuth2Error::MissingCodeVerifier) => {
                "missing_code_verifier".to_string()
            }
            Self::OAuth2Error(OAuth2Error::TokenExchange(_)) => {
                "token_exchange_failed".to_string()
            }
            _ => "internal_error".to_string(),
        }
    }
}

impl From<OAuth2Error> for CoordinationError {
    fn from(err: OAuth2Error) -> Self {
        let error = Self::OAuth2Error(err);
        tracing::error!("{}", error);
        error
    }
}

impl From<SessionError> for CoordinationError {
    fn from(err: SessionError) -> Self {
        // Anonymous requests are routine
        match &err {
            SessionError::NotAuthenticated => tracing::debug!("Session error: {}", err),
            _ => tracing::error!("Session error: {}", err),
        }
        Self::SessionError(err)
    }
}

impl From<UtilError> for CoordinationError {
    fn from(err: UtilError) -> Self {
        let error = Self::UtilsError(err);
        tracing::error!("{}", error);
        error
    }
}
