//! Login flow coordination
//!
//! Entry points used by the web framework integration. Each one ties the
//! OAuth2 protocol steps to the cookie-held session.

mod errors;
mod oauth2;
mod user;

pub use errors::CoordinationError;
pub use oauth2::{authorize_core, callback_core};
pub use user::{get_user_core, logout_core};
