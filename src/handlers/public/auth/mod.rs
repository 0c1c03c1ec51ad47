// handlers/public/auth/mod.rs - Token acquisition and account registration

pub mod register; // POST /register - create an account (admin token needed for admin accounts)
pub mod token; // POST /token - exchange credentials for a bearer token

pub use register::register_post;
pub use token::token_post;
