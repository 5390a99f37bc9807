use axum::Json;
use http::StatusCode;
use serde_json::{Value, json};

use keycloak_pkce::{CoordinationError, SessionError};

/// Helper trait for converting errors to a JSON error response
pub trait IntoResponseError<T> {
    fn into_response_error(self) -> Result<T, (StatusCode, Json<Value>)>;
}

impl<T> IntoResponseError<T> for Result<T, CoordinationError> {
    fn into_response_error(self) -> Result<T, (StatusCode, Json<Value>)> {
        self.map_err(|e| {
            let (status, message) = match &e {
                CoordinationError::SessionError(SessionError::NotAuthenticated) => {
                    (StatusCode::UNAUTHORIZED, "Not authenticated".to_string())
                }
                CoordinationError::SessionError(SessionError::InvalidUserData(_)) => {
                    (StatusCode::BAD_REQUEST, "Invalid user data".to_string())
                }
                _ => (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()),
            };
            (status, Json(json!({ "error": message })))
        })
    }
}
