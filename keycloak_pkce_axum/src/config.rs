use std::sync::LazyLock;

/// Where unauthenticated GET requests to protected pages are sent
///
/// Default: "/"
pub static KEYCLOAK_REDIRECT_ANON: LazyLock<String> =
    LazyLock::new(|| std::env::var("KEYCLOAK_REDIRECT_ANON").unwrap_or_else(|_| "/".to_string()));
