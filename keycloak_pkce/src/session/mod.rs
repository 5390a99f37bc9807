mod errors;
mod main;
mod types;

pub use errors::SessionError;
pub use main::{get_session, prepare_logout_response};
pub use types::Session;

pub(crate) use main::prepare_session_headers;

/// Holds the access token issued by Keycloak.
pub const ACCESS_TOKEN_COOKIE_NAME: &str = "access_token";
/// Holds the percent-encoded JSON of the verified ID token claims.
pub const USER_INFO_COOKIE_NAME: &str = "user_info";

/// Session cookie lifetime when the token response carries no `expires_in`.
pub(crate) const DEFAULT_SESSION_MAX_AGE: i64 = 300;
