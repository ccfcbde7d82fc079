// handlers/public/mod.rs - Public handlers (no login required)
//
// The landing page, health probe, and the login round trip itself. Every request
// still passes the session middleware, so these handlers can see whether the
// visitor is logged in through `PageContext`.

pub mod auth;
pub mod home;

pub use auth::{authtest, callback, login, logout};
pub use home::{health, home};
