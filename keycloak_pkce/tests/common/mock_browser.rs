//! Minimal cookie-holding user agent

use http::HeaderMap;
use http::header::{COOKIE, HeaderValue, SET_COOKIE};
use std::collections::BTreeMap;

#[derive(Debug, Default)]
pub struct MockBrowser {
    cookies: BTreeMap<String, String>,
}

impl MockBrowser {
    pub fn new() -> Self {
        Self::default()
    }

    /// Applies every `Set-Cookie` in `headers`. `Max-Age=0` removes the cookie.
    pub fn receive(&mut self, headers: &HeaderMap) {
        for value in headers.get_all(SET_COOKIE) {
            let value = value.to_str().expect("Set-Cookie is not ASCII");
            let mut parts = value.split(';').map(str::trim);
            let (name, cookie_value) = parts
                .next()
                .and_then(|pair| pair.split_once('='))
                .expect("Malformed Set-Cookie");
            let expired = parts.any(|attr| attr == "Max-Age=0");
            if expired {
                self.cookies.remove(name);
            } else {
                self.cookies
                    .insert(name.to_string(), cookie_value.to_string());
            }
        }
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.cookies.get(name).map(String::as_str)
    }

    pub fn has(&self, name: &str) -> bool {
        self.cookies.contains_key(name)
    }

    /// Request headers carrying the current cookies.
    pub fn request_headers(&self) -> HeaderMap {
        let mut headers = HeaderMap::new();
        if !self.cookies.is_empty() {
            let cookie = self
                .cookies
                .iter()
                .map(|(name, value)| format!("{name}={value}"))
                .collect::<Vec<_>>()
                .join("; ");
            headers.insert(COOKIE, HeaderValue::from_str(&cookie).unwrap());
        }
        headers
    }
}
