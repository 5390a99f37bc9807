mod core;
mod idtoken;
mod pkce;
mod token;

pub use core::prepare_auth_request;

pub(crate) use core::{csrf_checks, delete_flow_cookies, get_code_verifier, get_idinfo_from_code};
pub(crate) use idtoken::JwksCache;
