mod client;
mod errors;
mod main;
mod types;

pub use client::KeycloakClient;
pub use errors::OAuth2Error;
pub use main::prepare_auth_request;
pub use types::{AuthResponse, IdClaims, TokenResponse};

pub(crate) use main::{csrf_checks, delete_flow_cookies, get_code_verifier, get_idinfo_from_code};

/// Holds the CSRF state token between the redirect and the callback.
pub const OAUTH_STATE_COOKIE_NAME: &str = "oauth_state";
/// Holds the PKCE code verifier between the redirect and the callback.
pub const CODE_VERIFIER_COOKIE_NAME: &str = "code_verifier";
