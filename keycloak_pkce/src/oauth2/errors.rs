use crate::utils::UtilError;
use thiserror::Error;

#[derive(Debug, Error, Clone)]
pub enum OAuth2Error {
    #[error("Csrf token mismatch")]
    CsrfTokenMismatch,

    #[error("Login flow expired")]
    FlowExpired,

    #[error("Code verifier cookie not found")]
    MissingCodeVerifier,

    #[error("Http client error: {0}")]
    HttpClient(String),

    #[error("Token exchange rejected: {0}")]
    TokenExchange(String),

    #[error("Invalid token response: {0}")]
    InvalidTokenResponse(String),

    #[error("Id token error: {0}")]
    IdToken(String),

    #[error("Jwks fetch error: {0}")]
    JwksFetch(String),

    #[error("Invalid authorization url: {0}")]
    InvalidUrl(String),

    /// Error from utils operations
    #[error("Utils error: {0}")]
    Utils(#[from] UtilError),
}

impl From<reqwest::Error> for OAuth2Error {
    fn from(err: reqwest::Error) -> Self {
        Self::HttpClient(err.to_string())
    }
}
