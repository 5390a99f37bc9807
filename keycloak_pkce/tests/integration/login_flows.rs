use http::StatusCode;
use http::header::SET_COOKIE;
use std::time::Duration;

use keycloak_pkce::{
    AuthResponse, CoordinationError, KeycloakClient, SessionError, authorize_core, callback_core,
    get_user_core, logout_core,
};

use crate::common::mock_keycloak::MockSettings;
use crate::common::{MockBrowser, MockKeycloak, auth_url_params};

/// Runs the initiator and the simulated Keycloak sign-in. Returns the
/// callback parameters Keycloak would redirect with.
fn start_login(
    mock: &MockKeycloak,
    client: &KeycloakClient,
    browser: &mut MockBrowser,
    code: &str,
) -> AuthResponse {
    let (auth_url, headers) = authorize_core(client).unwrap();
    browser.receive(&headers);

    let params = auth_url_params(&auth_url);
    mock.approve(code, &params["code_challenge"]);

    AuthResponse {
        code: Some(code.to_string()),
        state: Some(params["state"].clone()),
        ..Default::default()
    }
}

async fn finish_login(
    client: &KeycloakClient,
    browser: &mut MockBrowser,
    auth_response: &AuthResponse,
) -> (http::HeaderMap, String) {
    let (headers, location) =
        callback_core(client, auth_response, &browser.request_headers()).await;
    browser.receive(&headers);
    (headers, location)
}

fn session_cookie_max_ages(headers: &http::HeaderMap) -> Vec<String> {
    headers
        .get_all(SET_COOKIE)
        .iter()
        .map(|v| v.to_str().unwrap())
        .filter(|v| v.starts_with("access_token=") || v.starts_with("user_info="))
        .filter_map(|v| {
            v.split("; ")
                .find(|attr| attr.starts_with("Max-Age="))
                .map(str::to_string)
        })
        .collect()
}

/// Test the complete login: initiator, callback, session read and logout
#[tokio::test]
async fn test_login_flow_establishes_session() {
    let mock = MockKeycloak::start().await;
    let client = mock.client();
    let mut browser = MockBrowser::new();

    let auth_response = start_login(&mock, &client, &mut browser, "code-1");
    assert!(browser.has("oauth_state"));
    assert!(browser.has("code_verifier"));

    let (headers, location) = finish_login(&client, &mut browser, &auth_response).await;

    assert_eq!(location, "/?login=success");
    assert_eq!(
        session_cookie_max_ages(&headers),
        vec!["Max-Age=300", "Max-Age=300"]
    );
    assert!(!browser.has("oauth_state"));
    assert!(!browser.has("code_verifier"));
    assert_eq!(browser.get("access_token"), Some("mock_access_token_code-1"));

    let session = get_user_core(&browser.request_headers()).unwrap();
    assert_eq!(session.access_token, "mock_access_token_code-1");
    assert_eq!(session.preferred_username(), Some("alice"));
    assert_eq!(session.email(), Some("alice@example.com"));
    assert_eq!(
        session.user["iss"].as_str(),
        Some(mock.issuer_url.as_str())
    );

    let logout_headers = logout_core(&client).unwrap();
    browser.receive(&logout_headers);
    assert!(!browser.has("access_token"));
    assert!(!browser.has("user_info"));
    assert!(matches!(
        get_user_core(&browser.request_headers()),
        Err(CoordinationError::SessionError(
            SessionError::NotAuthenticated
        ))
    ));
}

#[tokio::test]
async fn test_session_lifetime_follows_expires_in() {
    let mock = MockKeycloak::start().await;
    let client = mock.client();

    for (expires_in, expected) in [(Some(900), "Max-Age=900"), (None, "Max-Age=300")] {
        mock.update(|s| s.expires_in = expires_in);
        let mut browser = MockBrowser::new();
        let code = format!("code-{expected}");

        let auth_response = start_login(&mock, &client, &mut browser, &code);
        let (headers, location) = finish_login(&client, &mut browser, &auth_response).await;

        assert_eq!(location, "/?login=success");
        assert_eq!(session_cookie_max_ages(&headers), vec![expected, expected]);
    }
}

/// Token endpoint rejection: flow cookies are cleared, no session is created
#[tokio::test]
async fn test_token_endpoint_rejection() {
    let mock = MockKeycloak::start().await;
    mock.update(|s| s.token_failure = Some(StatusCode::BAD_REQUEST));
    let client = mock.client();
    let mut browser = MockBrowser::new();

    let auth_response = start_login(&mock, &client, &mut browser, "code-1");
    let (_, location) = finish_login(&client, &mut browser, &auth_response).await;

    assert_eq!(location, "/?error=token_exchange_failed");
    assert!(!browser.has("oauth_state"));
    assert!(!browser.has("code_verifier"));
    assert!(!browser.has("access_token"));
    assert!(!browser.has("user_info"));
    assert_eq!(mock.token_requests(), 1);
}

/// A token endpoint that stalls past the client timeout is an internal error,
/// not a provider rejection
#[tokio::test]
async fn test_token_endpoint_timeout() {
    let mock = MockKeycloak::start().await;
    mock.update(|s| s.token_delay = Some(Duration::from_secs(5)));
    let client = mock.client_with(&[("KEYCLOAK_HTTP_TIMEOUT_SECS", "1")]);
    let mut browser = MockBrowser::new();

    let auth_response = start_login(&mock, &client, &mut browser, "code-1");
    let (_, location) = finish_login(&client, &mut browser, &auth_response).await;

    assert_eq!(location, "/?error=internal_error");
    assert!(!browser.has("oauth_state"));
    assert!(!browser.has("code_verifier"));
    assert!(!browser.has("access_token"));
    assert_eq!(mock.token_requests(), 1);
}

/// Keycloak rejects a verifier that does not match the registered challenge
#[tokio::test]
async fn test_pkce_mismatch_is_rejected_by_provider() {
    let mock = MockKeycloak::start().await;
    let client = mock.client();
    let mut browser = MockBrowser::new();

    let auth_response = start_login(&mock, &client, &mut browser, "code-1");
    // Re-register the code against another challenge
    mock.approve("code-1", "E9Melhoa2OwvFrEMTJguCHaoeK1t8URWbuGJSstw-cM");

    let (_, location) = finish_login(&client, &mut browser, &auth_response).await;
    assert_eq!(location, "/?error=token_exchange_failed");
    assert!(!browser.has("access_token"));
}

/// A replayed callback finds no flow state and never reaches Keycloak
#[tokio::test]
async fn test_replayed_callback_is_rejected() {
    let mock = MockKeycloak::start().await;
    let client = mock.client();
    let mut browser = MockBrowser::new();

    let auth_response = start_login(&mock, &client, &mut browser, "code-1");
    let (_, location) = finish_login(&client, &mut browser, &auth_response).await;
    assert_eq!(location, "/?login=success");

    let (_, location) = finish_login(&client, &mut browser, &auth_response).await;
    assert_eq!(location, "/?error=invalid_state");
    assert_eq!(mock.token_requests(), 1);
    // The established session is untouched
    assert!(browser.has("access_token"));
}

/// A second initiator call supersedes the first attempt
#[tokio::test]
async fn test_second_login_supersedes_first() {
    let mock = MockKeycloak::start().await;
    let client = mock.client();
    let mut browser = MockBrowser::new();

    let first = start_login(&mock, &client, &mut browser, "code-1");
    let second = start_login(&mock, &client, &mut browser, "code-2");

    let (_, location) = finish_login(&client, &mut browser, &first).await;
    assert_eq!(location, "/?error=invalid_state");
    assert_eq!(mock.token_requests(), 0);

    let (_, location) = finish_login(&client, &mut browser, &second).await;
    assert_eq!(location, "/?login=success");
}

/// Rotated signing keys are picked up with a single refetch
#[tokio::test]
async fn test_jwks_refetched_after_key_rotation() {
    let mock = MockKeycloak::start().await;
    let client = mock.client();

    let mut browser = MockBrowser::new();
    let auth_response = start_login(&mock, &client, &mut browser, "code-1");
    let (_, location) = finish_login(&client, &mut browser, &auth_response).await;
    assert_eq!(location, "/?login=success");
    assert_eq!(mock.jwks_fetches(), 1);

    mock.update(|s| {
        s.published_kid = "rotated_key_id".to_string();
        s.signing_kid = "rotated_key_id".to_string();
    });

    let mut browser = MockBrowser::new();
    let auth_response = start_login(&mock, &client, &mut browser, "code-2");
    let (_, location) = finish_login(&client, &mut browser, &auth_response).await;
    assert_eq!(location, "/?login=success");
    assert_eq!(mock.jwks_fetches(), 2);

    // Refreshed keys are cached
    let mut browser = MockBrowser::new();
    let auth_response = start_login(&mock, &client, &mut browser, "code-3");
    let (_, location) = finish_login(&client, &mut browser, &auth_response).await;
    assert_eq!(location, "/?login=success");
    assert_eq!(mock.jwks_fetches(), 2);
}

/// ID tokens that fail verification end the flow with internal_error
#[tokio::test]
async fn test_unverifiable_id_token() {
    let cases: [(&str, fn(&mut MockSettings)); 3] = [
        ("unknown kid", |s| s.signing_kid = "never_published".to_string()),
        ("wrong secret", |s| s.sign_with_wrong_secret = true),
        ("missing id_token", |s| s.include_id_token = false),
    ];

    for (name, configure) in cases {
        let mock = MockKeycloak::start().await;
        mock.update(configure);
        let client = mock.client();
        let mut browser = MockBrowser::new();

        let auth_response = start_login(&mock, &client, &mut browser, "code-1");
        let (_, location) = finish_login(&client, &mut browser, &auth_response).await;

        assert_eq!(location, "/?error=internal_error", "{name}");
        assert!(!browser.has("access_token"), "{name}");
        assert!(!browser.has("oauth_state"), "{name}");
    }
}

#[tokio::test]
async fn test_issuer_mismatch() {
    let mock = MockKeycloak::start().await;
    let client = mock.client_with(&[(
        "KEYCLOAK_EXPECTED_ISSUER",
        "http://localhost:8080/realms/another-realm",
    )]);
    let mut browser = MockBrowser::new();

    let auth_response = start_login(&mock, &client, &mut browser, "code-1");
    let (_, location) = finish_login(&client, &mut browser, &auth_response).await;
    assert_eq!(location, "/?error=internal_error");
}

/// Browser-facing and back-channel realm URLs may differ
#[tokio::test]
async fn test_internal_url_for_back_channel() {
    let mock = MockKeycloak::start().await;
    let client = mock.client_with(&[
        (
            "KEYCLOAK_ISSUER_URL",
            "http://localhost:8080/realms/one-account-realm",
        ),
        ("KEYCLOAK_INTERNAL_URL", mock.issuer_url.as_str()),
        ("KEYCLOAK_EXPECTED_ISSUER", mock.issuer_url.as_str()),
        ("APP_HOME_URL", "http://localhost:3000/dashboard"),
    ]);
    let mut browser = MockBrowser::new();

    let (auth_url, _) = authorize_core(&client).unwrap();
    assert!(auth_url.starts_with(
        "http://localhost:8080/realms/one-account-realm/protocol/openid-connect/auth?"
    ));

    let auth_response = start_login(&mock, &client, &mut browser, "code-1");
    let (_, location) = finish_login(&client, &mut browser, &auth_response).await;
    assert_eq!(location, "http://localhost:3000/dashboard?login=success");
}
