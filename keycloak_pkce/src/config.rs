//! Central configuration for the keycloak_pkce crate

use std::sync::LazyLock;
use std::time::Duration;

use thiserror::Error;
use url::Url;

/// Route prefix under which the login endpoints are mounted
///
/// Default: "/api/keycloak"
pub static KEYCLOAK_ROUTE_PREFIX: LazyLock<String> =
    LazyLock::new(|| route_prefix(std::env::var("KEYCLOAK_ROUTE_PREFIX").ok()));

/// Blank values fall back to the default, as in `KeycloakConfig::from_lookup`.
fn route_prefix(value: Option<String>) -> String {
    value
        .filter(|v| !v.trim().is_empty())
        .unwrap_or_else(|| DEFAULT_ROUTE_PREFIX.to_string())
}

const DEFAULT_ROUTE_PREFIX: &str = "/api/keycloak";
const DEFAULT_ORIGIN: &str = "http://localhost:3000";
const DEFAULT_SCOPE: &str = "openid profile email";
const DEFAULT_FLOW_COOKIE_MAX_AGE: i64 = 600;
const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 10;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    Missing(&'static str),

    #[error("Invalid value for {name}: {reason}")]
    Invalid { name: &'static str, reason: String },
}

/// Settings for the single Keycloak realm and client this application talks to.
#[derive(Clone)]
pub struct KeycloakConfig {
    /// Public realm URL as seen by the browser, e.g.
    /// `http://localhost:8080/realms/one-account-realm`.
    pub issuer_url: String,
    /// Realm URL used for server-to-server calls (token, certs).
    pub internal_url: String,
    /// Value required in the ID token `iss` claim.
    pub expected_issuer: String,
    pub client_id: String,
    pub client_secret: String,
    /// Fixed redirect URI registered with the client. Sent on both legs.
    pub redirect_uri: String,
    /// Where callback outcomes redirect to. Path or absolute URL.
    pub app_home_url: String,
    pub scope: String,
    /// Lifetime of the `oauth_state` / `code_verifier` cookies in seconds.
    pub flow_cookie_max_age: i64,
    pub cookie_secure: bool,
    pub http_timeout: Duration,
}

impl KeycloakConfig {
    /// Reads the configuration from process environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Builds the configuration from an arbitrary variable source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        let issuer_url =
            get("KEYCLOAK_ISSUER_URL").ok_or(ConfigError::Missing("KEYCLOAK_ISSUER_URL"))?;
        let issuer_url = validate_url("KEYCLOAK_ISSUER_URL", &issuer_url)?;

        let internal_url = match get("KEYCLOAK_INTERNAL_URL") {
            Some(url) => validate_url("KEYCLOAK_INTERNAL_URL", &url)?,
            None => issuer_url.clone(),
        };

        let expected_issuer = get("KEYCLOAK_EXPECTED_ISSUER")
            .map(|v| v.trim_end_matches('/').to_string())
            .unwrap_or_else(|| issuer_url.clone());

        let client_id =
            get("KEYCLOAK_CLIENT_ID").ok_or(ConfigError::Missing("KEYCLOAK_CLIENT_ID"))?;
        let client_secret =
            get("KEYCLOAK_CLIENT_SECRET").ok_or(ConfigError::Missing("KEYCLOAK_CLIENT_SECRET"))?;

        let origin = get("ORIGIN").unwrap_or_else(|| DEFAULT_ORIGIN.to_string());
        let prefix = route_prefix(get("KEYCLOAK_ROUTE_PREFIX"));
        let redirect_uri = match get("KEYCLOAK_REDIRECT_URI") {
            Some(uri) => uri,
            None => format!("{}{}/callback", origin.trim_end_matches('/'), prefix),
        };
        Url::parse(&redirect_uri).map_err(|e| ConfigError::Invalid {
            name: "KEYCLOAK_REDIRECT_URI",
            reason: e.to_string(),
        })?;

        let app_home_url = get("APP_HOME_URL").unwrap_or_else(|| "/".to_string());
        let scope = get("KEYCLOAK_SCOPE").unwrap_or_else(|| DEFAULT_SCOPE.to_string());

        let flow_cookie_max_age = match get("KEYCLOAK_FLOW_COOKIE_MAX_AGE") {
            Some(v) => v
                .parse::<i64>()
                .ok()
                .filter(|secs| *secs > 0)
                .ok_or_else(|| ConfigError::Invalid {
                    name: "KEYCLOAK_FLOW_COOKIE_MAX_AGE",
                    reason: format!("expected a positive number of seconds, got {v:?}"),
                })?,
            None => DEFAULT_FLOW_COOKIE_MAX_AGE,
        };

        let cookie_secure = match get("KEYCLOAK_COOKIE_SECURE") {
            Some(v) => parse_bool("KEYCLOAK_COOKIE_SECURE", &v)?,
            None => redirect_uri.starts_with("https://"),
        };

        let http_timeout = match get("KEYCLOAK_HTTP_TIMEOUT_SECS") {
            Some(v) => Duration::from_secs(v.parse::<u64>().map_err(|e| {
                ConfigError::Invalid {
                    name: "KEYCLOAK_HTTP_TIMEOUT_SECS",
                    reason: e.to_string(),
                }
            })?),
            None => Duration::from_secs(DEFAULT_HTTP_TIMEOUT_SECS),
        };

        Ok(Self {
            issuer_url,
            internal_url,
            expected_issuer,
            client_id,
            client_secret,
            redirect_uri,
            app_home_url,
            scope,
            flow_cookie_max_age,
            cookie_secure,
            http_timeout,
        })
    }

    pub fn auth_url(&self) -> String {
        format!("{}/protocol/openid-connect/auth", self.issuer_url)
    }

    pub fn token_url(&self) -> String {
        format!("{}/protocol/openid-connect/token", self.internal_url)
    }

    pub fn jwks_url(&self) -> String {
        format!("{}/protocol/openid-connect/certs", self.internal_url)
    }
}

impl std::fmt::Debug for KeycloakConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KeycloakConfig")
            .field("issuer_url", &self.issuer_url)
            .field("internal_url", &self.internal_url)
            .field("expected_issuer", &self.expected_issuer)
            .field("client_id", &self.client_id)
            .field("client_secret", &"<redacted>")
            .field("redirect_uri", &self.redirect_uri)
            .field("app_home_url", &self.app_home_url)
            .field("scope", &self.scope)
            .field("flow_cookie_max_age", &self.flow_cookie_max_age)
            .field("cookie_secure", &self.cookie_secure)
            .field("http_timeout", &self.http_timeout)
            .finish()
    }
}

fn validate_url(name: &'static str, value: &str) -> Result<String, ConfigError> {
    let parsed = Url::parse(value).map_err(|e| ConfigError::Invalid {
        name,
        reason: e.to_string(),
    })?;
    match parsed.scheme() {
        "http" | "https" => Ok(value.trim_end_matches('/').to_string()),
        scheme => Err(ConfigError::Invalid {
            name,
            reason: format!("unsupported scheme {scheme}"),
        }),
    }
}

fn parse_bool(name: &'static str, value: &str) -> Result<bool, ConfigError> {
    match value.to_lowercase().as_str() {
        "true" | "1" | "yes" => Ok(true),
        "false" | "0" | "no" => Ok(false),
        _ => Err(ConfigError::Invalid {
            name,
            reason: format!("expected true or false, got {value:?}"),
        }),
    }
}
