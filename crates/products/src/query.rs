//! Read-only listings, search and counts.

use std::collections::BTreeMap;
use std::sync::Arc;

use pricelens_catalog::repository::ProductRepository;
use pricelens_catalog::{Product, ProductQuery, ProductStatus, QueryOverrides};
use pricelens_core::{DomainResult, Page, PageRequest};

#[cfg_attr(test, mockall::automock)]
pub trait ProductQueryService: Send + Sync {
    /// Runs `query` as given. Public callers must have applied
    /// `QueryOverrides::public()` already.
    fn list(&self, query: &ProductQuery, admin_mode: bool) -> DomainResult<Page<Product>>;
    /// Published, non-trashed products matching `term`, best sellers first.
    fn search(&self, term: &str, limit: u32) -> DomainResult<Vec<Product>>;
    fn by_status(&self, status: ProductStatus, limit: u32) -> DomainResult<Vec<Product>>;
    fn count_by_status(&self) -> DomainResult<BTreeMap<ProductStatus, u64>>;
}

#[derive(Clone)]
pub struct ProductQueries {
    products: Arc<dyn ProductRepository>,
}

impl ProductQueries {
    pub fn new(products: Arc<dyn ProductRepository>) -> Self {
        Self { products }
    }
}

impl ProductQueryService for ProductQueries {
    fn list(&self, query: &ProductQuery, admin_mode: bool) -> DomainResult<Page<Product>> {
        if !admin_mode && !query.is_public_safe() {
            tracing::warn!(
                status = ?query.status(),
                trashed = ?query.trashed(),
                "public listing without storefront constraints"
            );
        }
        self.products.list(query)
    }

    fn search(&self, term: &str, limit: u32) -> DomainResult<Vec<Product>> {
        if term.trim().is_empty() {
            return Ok(Vec::new());
        }
        let query = ProductQuery::new().with_search(term).with(QueryOverrides {
            sort: Some(pricelens_catalog::ProductSort::Popular),
            page: Some(PageRequest::new(1, limit)),
            ..QueryOverrides::public()
        });
        Ok(self.products.list(&query)?.items)
    }

    fn by_status(&self, status: ProductStatus, limit: u32) -> DomainResult<Vec<Product>> {
        let query = ProductQuery::new().with(QueryOverrides {
            page: Some(PageRequest::new(1, limit)),
            ..QueryOverrides::status(status)
        });
        Ok(self.products.list(&query)?.items)
    }

    fn count_by_status(&self) -> DomainResult<BTreeMap<ProductStatus, u64>> {
        self.products.count_by_status()
    }
}
