pub mod analytics;
pub mod audit;
pub mod product;
pub mod user;

pub use analytics::{ProductView, ProductViewCount};
pub use audit::{AuditAction, AuditEntry};
pub use product::{Product, ProductInput, ProductPatch};
pub use user::{User, UserSummary};
