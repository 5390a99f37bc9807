use std::sync::Arc;
use std::time::Duration;

use tokio::sync::RwLock;

use crate::config::KeycloakConfig;

use super::errors::OAuth2Error;
use super::main::JwksCache;

/// The OAuth2 client for one Keycloak realm.
///
/// Cheap to clone. Holds the configuration, a pooled HTTP client and the
/// realm's signing keys.
#[derive(Clone)]
pub struct KeycloakClient {
    inner: Arc<Inner>,
}

struct Inner {
    config: KeycloakConfig,
    http: reqwest::Client,
    jwks: RwLock<Option<JwksCache>>,
}

impl KeycloakClient {
    /// Creates a client with an HTTP connection pool configured as follows:
    ///
    /// - `timeout`: `config.http_timeout`. The code exchange is a one-shot call
    ///   and must not hang on an unresponsive provider.
    /// - `pool_idle_timeout`: 90 seconds.
    /// - `pool_max_idle_per_host`: 32.
    pub fn new(config: KeycloakConfig) -> Result<Self, OAuth2Error> {
        let http = reqwest::Client::builder()
            .timeout(config.http_timeout)
            .pool_idle_timeout(Duration::from_secs(90))
            .pool_max_idle_per_host(32)
            .build()?;

        Ok(Self {
            inner: Arc::new(Inner {
                config,
                http,
                jwks: RwLock::new(None),
            }),
        })
    }

    pub fn config(&self) -> &KeycloakConfig {
        &self.inner.config
    }

    pub(crate) fn http(&self) -> &reqwest::Client {
        &self.inner.http
    }

    pub(crate) fn jwks_cache(&self) -> &RwLock<Option<JwksCache>> {
        &self.inner.jwks
    }
}

impl std::fmt::Debug for KeycloakClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KeycloakClient")
            .field("issuer_url", &self.inner.config.issuer_url)
            .field("client_id", &self.inner.config.client_id)
            .finish_non_exhaustive()
    }
}
