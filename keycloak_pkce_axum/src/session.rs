use axum::{
    extract::{FromRequestParts, OptionalFromRequestParts},
    response::{IntoResponse, Redirect, Response},
};
use http::{Method, StatusCode, request::Parts};

use super::config::KEYCLOAK_REDIRECT_ANON;
use keycloak_pkce::{IdClaims, Session, get_session};

/// Rejection for [`KeycloakUser`]. GET requests are redirected to
/// `KEYCLOAK_REDIRECT_ANON`, everything else gets 401.
pub struct AuthRedirect {
    method: Method,
}

impl AuthRedirect {
    fn new(method: Method) -> Self {
        Self { method }
    }

    fn into_response_with_method(self) -> Response {
        if self.method == Method::GET {
            tracing::debug!("Redirecting to {}", KEYCLOAK_REDIRECT_ANON.as_str());
            Redirect::temporary(KEYCLOAK_REDIRECT_ANON.as_str()).into_response()
        } else {
            tracing::debug!("Unauthorized");
            (StatusCode::UNAUTHORIZED, "Unauthorized").into_response()
        }
    }
}

impl IntoResponse for AuthRedirect {
    fn into_response(self) -> Response {
        self.into_response_with_method()
    }
}

/// The signed-in user, available as an Axum extractor
///
/// Built from the `access_token` and `user_info` cookies set at login.
///
/// # Example
///
/// ```no_run
/// use axum::{routing::get, Router};
/// use keycloak_pkce_axum::KeycloakUser;
///
/// async fn protected_handler(user: KeycloakUser) -> String {
///     format!("Hello, {}!", user.display_name())
/// }
///
/// let app: Router = Router::new()
///     .route("/protected", get(protected_handler));
/// ```
#[derive(Clone, Debug)]
pub struct KeycloakUser {
    /// Keycloak subject identifier
    pub id: String,
    pub username: Option<String>,
    pub email: Option<String>,
    pub name: Option<String>,
    /// Every claim from the ID token
    pub claims: IdClaims,
    /// Access token for calling APIs on the user's behalf
    pub access_token: String,
}

impl KeycloakUser {
    /// Name, falling back to username, then subject.
    pub fn display_name(&self) -> &str {
        self.name
            .as_deref()
            .or(self.username.as_deref())
            .unwrap_or(&self.id)
    }
}

impl TryFrom<Session> for KeycloakUser {
    type Error = &'static str;

    fn try_from(session: Session) -> Result<Self, Self::Error> {
        let id = session.subject().ok_or("sub claim missing")?.to_string();
        Ok(KeycloakUser {
            id,
            username: session.preferred_username().map(str::to_string),
            email: session.email().map(str::to_string),
            name: session.claim_str("name").map(str::to_string),
            access_token: session.access_token,
            claims: session.user,
        })
    }
}

impl<S> FromRequestParts<S> for KeycloakUser
where
    S: Send + Sync,
{
    type Rejection = AuthRedirect;

    async fn from_request_parts(parts: &mut Parts, _: &S) -> Result<Self, Self::Rejection> {
        let session = get_session(&parts.headers).map_err(|e| {
            tracing::debug!("No usable session: {}", e);
            AuthRedirect::new(parts.method.clone())
        })?;

        KeycloakUser::try_from(session).map_err(|e| {
            tracing::warn!("Rejecting session: {}", e);
            AuthRedirect::new(parts.method.clone())
        })
    }
}

impl<S> OptionalFromRequestParts<S> for KeycloakUser
where
    S: Send + Sync,
{
    type Rejection = AuthRedirect;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &S,
    ) -> Result<Option<Self>, Self::Rejection> {
        let result: Result<Self, Self::Rejection> =
            <KeycloakUser as FromRequestParts<S>>::from_request_parts(parts, state).await;
        Ok(result.ok())
    }
}
