use thiserror::Error;

use crate::utils::UtilError;

#[derive(Debug, Error, Clone)]
pub enum SessionError {
    /// `access_token` or `user_info` cookie missing
    #[error("Not authenticated")]
    NotAuthenticated,

    #[error("Invalid user data: {0}")]
    InvalidUserData(String),

    #[error("Utils error: {0}")]
    Utils(#[from] UtilError),
}
