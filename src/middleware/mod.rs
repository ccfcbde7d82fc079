pub mod auth;
pub mod security;

pub use auth::{require_auth, session_middleware, CurrentUser};
pub use security::security_headers;
