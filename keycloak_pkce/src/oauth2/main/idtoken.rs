use chrono::{DateTime, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, Validation};
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use thiserror::Error;

use crate::oauth2::client::KeycloakClient;
use crate::oauth2::errors::OAuth2Error;
use crate::oauth2::types::IdClaims;
use crate::utils::base64url_decode;

#[derive(Debug, Serialize, Deserialize, Clone)]
pub(crate) struct Jwks {
    pub(crate) keys: Vec<Jwk>,
}

#[derive(Debug, Serialize, Deserialize, Clone, Default)]
pub(crate) struct Jwk {
    pub(crate) kty: String,
    pub(crate) kid: Option<String>,
    pub(crate) alg: Option<String>,
    #[serde(rename = "use")]
    pub(crate) key_use: Option<String>,
    pub(crate) n: Option<String>,
    pub(crate) e: Option<String>,
    pub(crate) x: Option<String>,
    pub(crate) y: Option<String>,
    pub(crate) k: Option<String>,
}

#[derive(Debug, Clone)]
pub(crate) struct JwksCache {
    jwks: Jwks,
    expires_at: DateTime<Utc>,
}

#[derive(Error, Debug)]
pub(crate) enum TokenVerificationError {
    #[error("JWT error: {0}")]
    JwtError(#[from] jsonwebtoken::errors::Error),
    #[error("Invalid token format")]
    InvalidTokenFormat,
    #[error("Token not yet valid, now: {0}, iat: {1}")]
    TokenNotYetValidIssuedAt(i64, i64),
    #[error("No matching key found in JWKS")]
    NoMatchingKey,
    #[error("Missing key component: {0}")]
    MissingKeyComponent(String),
    #[error("Unsupported key type: {0}")]
    UnsupportedKeyType(String),
    #[error("Key algorithm {0} does not match token algorithm {1:?}")]
    AlgorithmMismatch(String, Algorithm),
    #[error("Base64 decoding failed: {0}")]
    Base64Error(String),
    #[error("JWKS fetch error: {0}")]
    JwksFetch(String),
}

impl From<TokenVerificationError> for OAuth2Error {
    fn from(err: TokenVerificationError) -> Self {
        match err {
            TokenVerificationError::JwksFetch(msg) => OAuth2Error::JwksFetch(msg),
            other => OAuth2Error::IdToken(other.to_string()),
        }
    }
}

const CACHE_EXPIRATION_SECS: i64 = 600;

/// Allowed clock skew in seconds.
const LEEWAY: u64 = 2;

async fn fetch_jwks(client: &KeycloakClient) -> Result<Jwks, TokenVerificationError> {
    let jwks_url = client.config().jwks_url();
    let response = client
        .http()
        .get(&jwks_url)
        .send()
        .await
        .map_err(|e| TokenVerificationError::JwksFetch(e.to_string()))?;

    if !response.status().is_success() {
        return Err(TokenVerificationError::JwksFetch(format!(
            "{} returned {}",
            jwks_url,
            response.status()
        )));
    }

    let jwks: Jwks = response
        .json()
        .await
        .map_err(|e| TokenVerificationError::JwksFetch(e.to_string()))?;
    tracing::debug!("JWKs fetched from {}: {} keys", jwks_url, jwks.keys.len());
    Ok(jwks)
}

async fn get_jwks(
    client: &KeycloakClient,
    force_refresh: bool,
) -> Result<Jwks, TokenVerificationError> {
    if !force_refresh {
        if let Some(cached) = client.jwks_cache().read().await.as_ref() {
            if cached.expires_at > Utc::now() {
                tracing::debug!("Returning valid cached JWKs");
                return Ok(cached.jwks.clone());
            }
        }
    }

    let jwks = fetch_jwks(client).await?;
    *client.jwks_cache().write().await = Some(JwksCache {
        jwks: jwks.clone(),
        expires_at: Utc::now() + chrono::Duration::seconds(CACHE_EXPIRATION_SECS),
    });
    Ok(jwks)
}

fn find_jwk<'a>(jwks: &'a Jwks, kid: &str) -> Option<&'a Jwk> {
    jwks.keys
        .iter()
        .filter(|key| key.key_use.as_deref().is_none_or(|u| u == "sig"))
        .find(|key| key.kid.as_deref() == Some(kid))
}

fn required<'a>(value: &'a Option<String>, name: &str) -> Result<&'a str, TokenVerificationError> {
    value
        .as_deref()
        .ok_or_else(|| TokenVerificationError::MissingKeyComponent(name.to_string()))
}

fn convert_jwk_to_decoding_key(
    jwk: &Jwk,
    alg: Algorithm,
) -> Result<DecodingKey, TokenVerificationError> {
    if let Some(jwk_alg) = jwk.alg.as_deref() {
        if Algorithm::from_str(jwk_alg).ok() != Some(alg) {
            return Err(TokenVerificationError::AlgorithmMismatch(
                jwk_alg.to_string(),
                alg,
            ));
        }
    }

    match jwk.kty.as_str() {
        "RSA" => Ok(DecodingKey::from_rsa_components(
            required(&jwk.n, "n")?,
            required(&jwk.e, "e")?,
        )?),
        "EC" => Ok(DecodingKey::from_ec_components(
            required(&jwk.x, "x")?,
            required(&jwk.y, "y")?,
        )?),
        "oct" => {
            let k = base64url_decode(required(&jwk.k, "k")?)
                .map_err(|e| TokenVerificationError::Base64Error(e.to_string()))?;
            Ok(DecodingKey::from_secret(&k))
        }
        kty => Err(TokenVerificationError::UnsupportedKeyType(kty.to_string())),
    }
}

fn token_kid(token: &str) -> Result<(String, Algorithm), TokenVerificationError> {
    if token.split('.').count() != 3 {
        return Err(TokenVerificationError::InvalidTokenFormat);
    }
    let header = jsonwebtoken::decode_header(token)?;
    let kid = header
        .kid
        .ok_or_else(|| TokenVerificationError::MissingKeyComponent("kid".to_string()))?;
    Ok((kid, header.alg))
}

/// Verifies signature, audience, issuer and validity window, then returns the
/// payload claims.
pub(crate) fn verify_idtoken_with_jwks(
    token: &str,
    jwks: &Jwks,
    audience: &str,
    issuer: &str,
) -> Result<IdClaims, TokenVerificationError> {
    let (kid, alg) = token_kid(token)?;
    tracing::debug!("Algorithm from JWT header: {:?}, kid: {}", alg, kid);

    let jwk = find_jwk(jwks, &kid).ok_or(TokenVerificationError::NoMatchingKey)?;
    let decoding_key = convert_jwk_to_decoding_key(jwk, alg)?;

    let mut validation = Validation::new(alg);
    validation.set_audience(&[audience]);
    validation.set_issuer(&[issuer]);
    validation.set_required_spec_claims(&["exp", "iat", "iss", "aud", "sub"]);
    validation.validate_nbf = true;
    validation.leeway = LEEWAY;

    let claims = jsonwebtoken::decode::<IdClaims>(token, &decoding_key, &validation)?.claims;

    let now = Utc::now().timestamp();
    if let Some(iat) = claims.get("iat").and_then(|v| v.as_i64()) {
        if iat > now + LEEWAY as i64 {
            return Err(TokenVerificationError::TokenNotYetValidIssuedAt(now, iat));
        }
    }

    Ok(claims)
}

/// Verifies an ID token against the realm's published keys.
///
/// An unknown `kid` triggers one refetch of the key set to pick up rotated keys.
pub(crate) async fn verify_idtoken(
    client: &KeycloakClient,
    token: &str,
) -> Result<IdClaims, OAuth2Error> {
    let (kid, _) = token_kid(token)?;

    let mut jwks = get_jwks(client, false).await?;
    if find_jwk(&jwks, &kid).is_none() {
        tracing::debug!("Key {} not in cached JWKs, refetching", kid);
        jwks = get_jwks(client, true).await?;
    }

    let config = client.config();
    let claims =
        verify_idtoken_with_jwks(token, &jwks, &config.client_id, &config.expected_issuer)?;
    Ok(claims)
}
