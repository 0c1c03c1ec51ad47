// handlers/public/mod.rs - Handlers reachable without an admin token
//
// Routes under `auth` and `products::get` still look at an optional bearer
// token: registration of admin accounts and view counting depend on it.

pub mod auth;
pub mod products;
pub mod service;
pub mod views;
