// handlers/protected/mod.rs - Protected handlers (login required)
//
// Routed behind `require_auth`, so an anonymous request never reaches them.
// Each takes a `CurrentUser` and scopes its single store call to that owner.

pub mod categories;
pub mod profile;
pub mod stuff;

pub use profile::profile;
