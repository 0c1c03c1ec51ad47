// handlers/mod.rs - Two handler tiers
//
// Public (no token, or an optional one) → Protected (admin token required)
pub mod protected;
pub mod public;
