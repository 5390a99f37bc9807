use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Decoded identity claims taken from a verified ID token payload.
pub type IdClaims = Map<String, Value>;

/// Query parameters Keycloak appends to the redirect URI.
///
/// Every field is optional so a malformed redirect still reaches the handler
/// and can be turned into an error redirect.
#[derive(Debug, Default, Clone, Deserialize)]
pub struct AuthResponse {
    pub code: Option<String>,
    pub state: Option<String>,
    pub error: Option<String>,
    pub error_description: Option<String>,
}

/// Token endpoint response for the authorization_code grant.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    pub id_token: Option<String>,
    pub refresh_token: Option<String>,
    pub expires_in: Option<i64>,
    pub token_type: Option<String>,
    pub scope: Option<String>,
}

/// The transient values that tie an authorization request to its callback.
#[derive(Debug, Clone, PartialEq)]
pub struct FlowState {
    pub state: String,
    pub code_verifier: String,
    /// Unix time the flow was started.
    pub issued_at: i64,
}

/// A verifier/challenge pair for the S256 PKCE method.
#[derive(Debug, Clone)]
pub struct PkcePair {
    pub verifier: String,
    pub challenge: String,
}
