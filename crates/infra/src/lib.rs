//! Infrastructure layer: storage adapters behind the domain ports.
//!
//! Everything here is in-memory. Each repository wraps an [`InMemoryStore`]
//! and can be swapped for a database-backed one without touching services.

pub mod accounts;
pub mod audit;
pub mod catalog;
pub mod store;


pub use accounts::{InMemoryAdminRepository, InMemoryRoleRepository};
pub use audit::{AuditFilter, AuditLog, AuditLogRepository, AuditService, InMemoryAuditLog, NewAuditLog};
pub use catalog::{
    InMemoryCategoryRepository, InMemoryLinkRepository, InMemoryMarketplaceRepository,
    InMemoryProductRepository,
};
pub use store::InMemoryStore;
