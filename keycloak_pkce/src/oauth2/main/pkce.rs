use chrono::Utc;
use sha2::{Digest, Sha256};
use subtle::ConstantTimeEq;

use crate::oauth2::errors::OAuth2Error;
use crate::oauth2::types::{FlowState, PkcePair};
use crate::utils::{base64url_encode, gen_random_string};

/// Random bytes behind both the state token and the verifier.
/// 32 bytes encode to 43 characters, the PKCE minimum.
const FLOW_TOKEN_BYTES: usize = 32;

pub(crate) fn code_challenge(verifier: &str) -> String {
    base64url_encode(Sha256::digest(verifier.as_bytes()))
}

pub(crate) fn generate_pkce_pair() -> Result<PkcePair, OAuth2Error> {
    let verifier = gen_random_string(FLOW_TOKEN_BYTES)?;
    let challenge = code_challenge(&verifier);
    Ok(PkcePair {
        verifier,
        challenge,
    })
}

/// Generates a fresh state token and PKCE pair. Returns the flow state to
/// keep on the agent and the challenge to send to the provider.
pub(crate) fn generate_flow_state() -> Result<(FlowState, String), OAuth2Error> {
    let state = gen_random_string(FLOW_TOKEN_BYTES)?;
    let pkce = generate_pkce_pair()?;
    Ok((
        FlowState {
            state,
            code_verifier: pkce.verifier,
            issued_at: Utc::now().timestamp(),
        },
        pkce.challenge,
    ))
}

/// Constant-time comparison of the echoed state against the stored one.
pub(crate) fn state_matches(received: &str, stored: Option<&str>) -> bool {
    match stored {
        Some(stored) => received.as_bytes().ct_eq(stored.as_bytes()).into(),
        None => false,
    }
}
