// handlers/protected/mod.rs - admin-only endpoints under /api
//
// Every route here sits behind `jwt_auth_middleware`, which puts an
// `AuthUser` into the request extensions.
pub mod auth;
pub mod sheets;

pub use auth::profile;
pub use sheets::{headers, process_raw, process_raw_without_group, recent, sheet_get};
