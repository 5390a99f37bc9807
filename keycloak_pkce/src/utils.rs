use base64::{Engine as _, engine::general_purpose::URL_SAFE_NO_PAD};
use headers::HeaderMapExt;
use http::header::{HeaderMap, SET_COOKIE};
use ring::rand::SecureRandom;
use thiserror::Error;

pub(crate) fn base64url_decode(input: &str) -> Result<Vec<u8>, UtilError> {
    let decoded = URL_SAFE_NO_PAD
        .decode(input)
        .map_err(|_| UtilError::Format("Failed to decode base64url".to_string()))?;
    Ok(decoded)
}

pub(crate) fn base64url_encode(input: impl AsRef<[u8]>) -> String {
    URL_SAFE_NO_PAD.encode(input)
}

/// Returns `len` bytes from the system CSPRNG, base64url encoded without padding.
pub fn gen_random_string(len: usize) -> Result<String, UtilError> {
    let rng = ring::rand::SystemRandom::new();
    let mut bytes = vec![0u8; len];
    rng.fill(&mut bytes)
        .map_err(|_| UtilError::Crypto("Failed to generate random string".to_string()))?;
    Ok(base64url_encode(bytes))
}

/// Appends a `Set-Cookie` header.
///
/// Every cookie this crate issues is `HttpOnly; SameSite=Lax; Path=/`.
/// `max_age` of `None` produces a browser-session cookie.
pub(crate) fn header_set_cookie(
    headers: &mut HeaderMap,
    name: &str,
    value: &str,
    max_age: Option<i64>,
    secure: bool,
) -> Result<(), UtilError> {
    let mut cookie = format!("{name}={value}; HttpOnly; SameSite=Lax; Path=/");
    if let Some(max_age) = max_age {
        cookie.push_str(&format!("; Max-Age={max_age}"));
    }
    if secure {
        cookie.push_str("; Secure");
    }
    headers.append(
        SET_COOKIE,
        cookie
            .parse()
            .map_err(|_| UtilError::Cookie(format!("Failed to parse cookie {name}")))?,
    );
    Ok(())
}

/// Appends a `Set-Cookie` header that expires `name` immediately.
pub(crate) fn header_delete_cookie(
    headers: &mut HeaderMap,
    name: &str,
    secure: bool,
) -> Result<(), UtilError> {
    header_set_cookie(headers, name, "", Some(0), secure)
}

/// Reads a cookie value from the request headers. Empty values count as absent.
pub(crate) fn get_cookie(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .typed_get::<headers::Cookie>()?
        .get(name)
        .filter(|value| !value.is_empty())
        .map(str::to_string)
}

#[derive(Debug, Error, Clone)]
pub enum UtilError {
    #[error("Crypto error: {0}")]
    Crypto(String),

    #[error("Cookie error: {0}")]
    Cookie(String),

    #[error("Invalid format: {0}")]
    Format(String),
}
