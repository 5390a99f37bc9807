use serde::Serialize;

use crate::oauth2::IdClaims;

/// An authenticated browser session, as carried by the session cookies.
#[derive(Debug, Clone, Serialize)]
pub struct Session {
    #[serde(skip_serializing)]
    pub access_token: String,
    pub user: IdClaims,
}

impl Session {
    /// Subject identifier from the ID token.
    pub fn subject(&self) -> Option<&str> {
        self.claim_str("sub")
    }

    pub fn preferred_username(&self) -> Option<&str> {
        self.claim_str("preferred_username")
    }

    pub fn email(&self) -> Option<&str> {
        self.claim_str("email")
    }

    pub fn claim_str(&self, name: &str) -> Option<&str> {
        self.user.get(name).and_then(|v| v.as_str())
    }
}
