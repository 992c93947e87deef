//! In-memory implementations of the catalog storage ports.

use std::collections::BTreeMap;

use pricelens_catalog::repository::{
    CategoryRepository, LinkRepository, MarketplaceRepository, Mutation, ProductRepository,
};
use pricelens_catalog::{Category, Link, Marketplace, Product, ProductQuery, ProductStatus};
use pricelens_core::{CategoryId, DomainResult, LinkId, MarketplaceId, Page, ProductId};

use crate::store::InMemoryStore;

#[derive(Debug)]
pub struct InMemoryProductRepository {
    store: InMemoryStore<Product>,
}

impl InMemoryProductRepository {
    pub fn new() -> Self {
        Self {
            store: InMemoryStore::new("product"),
        }
    }
}

impl Default for InMemoryProductRepository {
    fn default() -> Self {
        Self::new()
    }
}

impl ProductRepository for InMemoryProductRepository {
    fn insert(&self, product: Product) -> DomainResult<Product> {
        self.store
            .insert_unique(product, |a, b| a.slug == b.slug, "product slug is already taken")
    }

    fn find(&self, id: ProductId) -> DomainResult<Option<Product>> {
        self.store.get(id)
    }

    fn find_by_slug(&self, slug: &str) -> DomainResult<Option<Product>> {
        self.store.find(|p| p.slug == slug)
    }

    fn slug_exists(&self, slug: &str, except: Option<ProductId>) -> DomainResult<bool> {
        self.store.any(|p| p.slug == slug && Some(p.id) != except)
    }

    fn modify(&self, id: ProductId, f: Mutation<'_, Product>) -> DomainResult<Product> {
        self.store.modify(id, f)
    }

    fn list(&self, query: &ProductQuery) -> DomainResult<Page<Product>> {
        Ok(query.apply(self.store.list()?))
    }

    fn increment_views(&self, id: ProductId) -> DomainResult<u64> {
        let product = self.store.modify(id, &mut |p: &mut Product| {
            p.view_count += 1;
            Ok(())
        })?;
        Ok(product.view_count)
    }

    fn count_by_status(&self) -> DomainResult<BTreeMap<ProductStatus, u64>> {
        let mut counts: BTreeMap<ProductStatus, u64> =
            ProductStatus::ALL.into_iter().map(|s| (s, 0)).collect();
        for product in self.store.filter(|p| !p.is_trashed())? {
            *counts.entry(product.status).or_default() += 1;
        }
        Ok(counts)
    }

    fn count_in_category(&self, category_id: CategoryId) -> DomainResult<u64> {
        self.store
            .count(|p| !p.is_trashed() && p.category_id == Some(category_id))
    }
}

#[derive(Debug)]
pub struct InMemoryCategoryRepository {
    store: InMemoryStore<Category>,
}

impl InMemoryCategoryRepository {
    pub fn new() -> Self {
        Self {
            store: InMemoryStore::new("category"),
        }
    }
}

impl Default for InMemoryCategoryRepository {
    fn default() -> Self {
        Self::new()
    }
}

impl CategoryRepository for InMemoryCategoryRepository {
    fn insert(&self, category: Category) -> DomainResult<Category> {
        self.store
            .insert_unique(category, |a, b| a.slug == b.slug, "category slug is already taken")
    }

    fn find(&self, id: CategoryId) -> DomainResult<Option<Category>> {
        self.store.get(id)
    }

    fn find_by_slug(&self, slug: &str) -> DomainResult<Option<Category>> {
        self.store.find(|c| c.slug == slug)
    }

    fn slug_exists(&self, slug: &str, except: Option<CategoryId>) -> DomainResult<bool> {
        self.store.any(|c| c.slug == slug && Some(c.id) != except)
    }

    fn all(&self) -> DomainResult<Vec<Category>> {
        self.store.list()
    }

    fn children(&self, parent: CategoryId) -> DomainResult<Vec<Category>> {
        self.store.filter(|c| c.parent_id == Some(parent))
    }

    fn save(&self, category: Category) -> DomainResult<()> {
        self.store.replace(category)
    }

    fn delete(&self, id: CategoryId) -> DomainResult<()> {
        self.store.remove(id).map(|_| ())
    }
}

#[derive(Debug)]
pub struct InMemoryLinkRepository {
    store: InMemoryStore<Link>,
}

impl InMemoryLinkRepository {
    pub fn new() -> Self {
        Self {
            store: InMemoryStore::new("link"),
        }
    }
}

impl Default for InMemoryLinkRepository {
    fn default() -> Self {
        Self::new()
    }
}

impl LinkRepository for InMemoryLinkRepository {
    fn insert(&self, link: Link) -> DomainResult<Link> {
        self.store.insert(link)
    }

    fn find(&self, id: LinkId) -> DomainResult<Option<Link>> {
        self.store.get(id)
    }

    fn for_product(&self, product_id: ProductId) -> DomainResult<Vec<Link>> {
        self.store.filter(|l| l.product_id == product_id)
    }

    fn modify(&self, id: LinkId, f: Mutation<'_, Link>) -> DomainResult<Link> {
        self.store.modify(id, f)
    }

    fn delete(&self, id: LinkId) -> DomainResult<()> {
        self.store.remove(id).map(|_| ())
    }
}

#[derive(Debug)]
pub struct InMemoryMarketplaceRepository {
    store: InMemoryStore<Marketplace>,
}

impl InMemoryMarketplaceRepository {
    pub fn new() -> Self {
        Self {
            store: InMemoryStore::new("marketplace"),
        }
    }
}

impl Default for InMemoryMarketplaceRepository {
    fn default() -> Self {
        Self::new()
    }
}

impl MarketplaceRepository for InMemoryMarketplaceRepository {
    fn insert(&self, marketplace: Marketplace) -> DomainResult<Marketplace> {
        self.store.insert_unique(
            marketplace,
            |a, b| a.slug == b.slug,
            "marketplace slug is already taken",
        )
    }

    fn find(&self, id: MarketplaceId) -> DomainResult<Option<Marketplace>> {
        self.store.get(id)
    }

    fn all(&self) -> DomainResult<Vec<Marketplace>> {
        self.store.list()
    }

    fn slug_exists(&self, slug: &str) -> DomainResult<bool> {
        self.store.any(|m| m.slug == slug)
    }
}
