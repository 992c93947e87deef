//! `pricelens-core` — catalog foundation building blocks.
//!
//! This crate contains **pure domain** primitives (no infrastructure concerns).

pub mod entity;
pub mod error;
pub mod id;
pub mod input;
pub mod pagination;
pub mod value_object;

pub use entity::Entity;
pub use error::{DomainError, DomainResult, FieldErrors};
pub use input::{Input, RawInput};
pub use id::{AdminId, AuditLogId, CategoryId, LinkId, MarketplaceId, ProductId};
pub use pagination::{Page, PageMeta, PageRequest};
pub use value_object::ValueObject;
