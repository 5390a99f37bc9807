//! keycloak_pkce - Keycloak login with the Authorization Code flow and PKCE
//!
//! This crate runs the OAuth2 Authorization Code flow with PKCE (S256) against
//! a single Keycloak realm and keeps the resulting session in cookies. It is
//! framework agnostic: entry points take and return `http` headers, and the
//! `keycloak-pkce-axum` crate wires them to routes.

mod config;
mod coordination;
mod oauth2;
mod session;
mod utils;

pub use config::{ConfigError, KEYCLOAK_ROUTE_PREFIX, KeycloakConfig};

pub use coordination::{
    CoordinationError, authorize_core, callback_core, get_user_core, logout_core,
};

pub use oauth2::{
    AuthResponse, CODE_VERIFIER_COOKIE_NAME, IdClaims, KeycloakClient, OAUTH_STATE_COOKIE_NAME,
    OAuth2Error, TokenResponse, prepare_auth_request,
};

pub use session::{
    ACCESS_TOKEN_COOKIE_NAME, Session, SessionError, USER_INFO_COOKIE_NAME, get_session,
    prepare_logout_response,
};

pub use utils::{UtilError, gen_random_string};
