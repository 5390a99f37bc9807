use crate::oauth2::client::KeycloakClient;
use crate::oauth2::errors::OAuth2Error;
use crate::oauth2::types::TokenResponse;

/// Exchanges an authorization code for tokens.
///
/// Called exactly once per callback. Authorization codes are single-use, so a
/// failed attempt is reported rather than retried.
pub(crate) async fn exchange_code_for_token(
    client: &KeycloakClient,
    code: &str,
    code_verifier: &str,
) -> Result<TokenResponse, OAuth2Error> {
    let config = client.config();
    let token_url = config.token_url();
    tracing::debug!("Exchanging authorization code at {}", token_url);

    let response = client
        .http()
        .post(&token_url)
        .form(&[
            ("grant_type", "authorization_code"),
            ("client_id", config.client_id.as_str()),
            ("client_secret", config.client_secret.as_str()),
            ("code", code),
            ("redirect_uri", config.redirect_uri.as_str()),
            ("code_verifier", code_verifier),
        ])
        .send()
        .await?;

    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        tracing::error!("Token exchange failed with status {}: {}", status, body);
        return Err(OAuth2Error::TokenExchange(status.to_string()));
    }

    let body = response.text().await?;
    let token_response: TokenResponse = serde_json::from_str(&body)
        .map_err(|e| OAuth2Error::InvalidTokenResponse(e.to_string()))?;

    tracing::debug!(
        "Token exchange successful, id_token present: {}, expires_in: {:?}",
        token_response.id_token.is_some(),
        token_response.expires_in
    );

    Ok(token_response)
}
