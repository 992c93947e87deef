//! `pricelens-catalog` — catalog entities, request DTOs, queries and the
//! supporting (non-product) services.
//!
//! Storage is reached only through the ports in [`repository`].

pub mod bulk;
pub mod category;
pub mod link;
pub mod marketplace;
pub mod price;
pub mod product;
pub mod query;
pub mod repository;
pub mod requests;
pub mod service;
pub mod slug;

pub use bulk::{BulkAction, BulkActionRequest, BulkActionResult, BulkFailure, MAX_BULK_IDS};
pub use category::{Category, CategoryNode, CreateCategoryRequest, UpdateCategoryRequest};
pub use link::{CreateLinkRequest, Link, UpdateLinkRequest};
pub use marketplace::{CreateMarketplaceRequest, Marketplace};
pub use price::Price;
pub use product::{Product, ProductStatus};
pub use query::{ProductQuery, ProductSort, QueryOverrides, TrashedFilter};
pub use repository::{
    CategoryRepository, LinkRepository, MarketplaceRepository, Mutation, ProductRepository,
};
pub use requests::{CreateProductRequest, ProductPatch, QuickEditProductRequest, UpdateProductRequest};
pub use service::{CategoryService, LinkService, MarketplaceService};
