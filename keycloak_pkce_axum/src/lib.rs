mod config;
mod error;
mod oauth2;
mod router;
mod session;
mod user;

pub use config::KEYCLOAK_REDIRECT_ANON;
pub use error::IntoResponseError;
pub use router::{keycloak_router, keycloak_router_no_trace};
pub use session::{AuthRedirect, KeycloakUser};

// Re-export what an application needs to build the router
pub use keycloak_pkce::{
    ACCESS_TOKEN_COOKIE_NAME, ConfigError, KEYCLOAK_ROUTE_PREFIX, KeycloakClient, KeycloakConfig,
};

#[cfg(test)]
mod test_utils;
