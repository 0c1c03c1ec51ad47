// handlers/protected/mod.rs - Admin-only handlers
//
// Every route here sits behind `require_admin`, which puts the caller into
// the request extensions as an `AuthUser`.

pub mod products;
pub mod reports;
pub mod users;
