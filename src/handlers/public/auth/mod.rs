// handlers/public/auth/mod.rs - OpenID Connect login round trip
//
// GET /login     → provider authorization endpoint
// POST /callback ← provider form_post with the ID token
// GET /logout    → clears the session, then provider logout
// GET /authtest  → plain-text login state

pub mod callback;
pub mod login;

pub use callback::callback;
pub use login::{authtest, login, logout};
