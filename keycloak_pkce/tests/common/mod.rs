pub mod mock_browser;

pub use mock_browser::MockBrowser;
pub use mock_keycloak::MockKeycloak;

use std::collections::HashMap;
use url::Url;

/// Query parameters of the authorization redirect.
pub fn auth_url_params(auth_url: &str) -> HashMap<String, String> {
    Url::parse(auth_url)
        .expect("Invalid authorization URL")
        .query_pairs()
        .into_owned()
        .collect()
}
