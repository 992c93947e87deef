//! Storage ports for catalog entities.
//!
//! Implementations must be thread-safe; `modify` must apply the closure
//! atomically with respect to other writers of the same record.

use std::collections::BTreeMap;

use pricelens_core::{CategoryId, DomainResult, LinkId, MarketplaceId, Page, ProductId};

use crate::category::Category;
use crate::link::Link;
use crate::marketplace::Marketplace;
use crate::product::{Product, ProductStatus};
use crate::query::ProductQuery;

/// In-place mutation applied under the store's write lock.
pub type Mutation<'a, T> = &'a mut dyn FnMut(&mut T) -> DomainResult<()>;

pub trait ProductRepository: Send + Sync {
    fn insert(&self, product: Product) -> DomainResult<Product>;
    /// Lookup by id, trashed products included.
    fn find(&self, id: ProductId) -> DomainResult<Option<Product>>;
    fn find_by_slug(&self, slug: &str) -> DomainResult<Option<Product>>;
    /// Whether `slug` is used by a product other than `except`.
    fn slug_exists(&self, slug: &str, except: Option<ProductId>) -> DomainResult<bool>;
    fn modify(&self, id: ProductId, f: Mutation<'_, Product>) -> DomainResult<Product>;
    fn list(&self, query: &ProductQuery) -> DomainResult<Page<Product>>;
    fn increment_views(&self, id: ProductId) -> DomainResult<u64>;
    /// Non-trashed products per status; every status is present.
    fn count_by_status(&self) -> DomainResult<BTreeMap<ProductStatus, u64>>;
    /// Non-trashed products in a category.
    fn count_in_category(&self, category_id: CategoryId) -> DomainResult<u64>;
}

pub trait CategoryRepository: Send + Sync {
    fn insert(&self, category: Category) -> DomainResult<Category>;
    fn find(&self, id: CategoryId) -> DomainResult<Option<Category>>;
    fn find_by_slug(&self, slug: &str) -> DomainResult<Option<Category>>;
    fn slug_exists(&self, slug: &str, except: Option<CategoryId>) -> DomainResult<bool>;
    fn all(&self) -> DomainResult<Vec<Category>>;
    fn children(&self, parent: CategoryId) -> DomainResult<Vec<Category>>;
    fn save(&self, category: Category) -> DomainResult<()>;
    fn delete(&self, id: CategoryId) -> DomainResult<()>;
}

pub trait LinkRepository: Send + Sync {
    fn insert(&self, link: Link) -> DomainResult<Link>;
    fn find(&self, id: LinkId) -> DomainResult<Option<Link>>;
    fn for_product(&self, product_id: ProductId) -> DomainResult<Vec<Link>>;
    fn modify(&self, id: LinkId, f: Mutation<'_, Link>) -> DomainResult<Link>;
    fn delete(&self, id: LinkId) -> DomainResult<()>;
}

pub trait MarketplaceRepository: Send + Sync {
    fn insert(&self, marketplace: Marketplace) -> DomainResult<Marketplace>;
    fn find(&self, id: MarketplaceId) -> DomainResult<Option<Marketplace>>;
    fn all(&self) -> DomainResult<Vec<Marketplace>>;
    fn slug_exists(&self, slug: &str) -> DomainResult<bool>;
}
