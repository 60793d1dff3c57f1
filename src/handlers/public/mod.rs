// handlers/public/mod.rs - endpoints reachable without a session token
pub mod auth;
pub mod health;

pub use auth::{google_callback, google_redirect};
pub use health::{health, root};
