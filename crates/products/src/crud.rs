//! Create, read, update and (soft) delete.

use std::sync::Arc;

use chrono::Utc;

use pricelens_catalog::repository::{CategoryRepository, ProductRepository};
use pricelens_catalog::slug::{slugify, unique_slug};
use pricelens_catalog::{
    CreateProductRequest, Product, ProductPatch, QuickEditProductRequest, UpdateProductRequest,
};
use pricelens_core::{CategoryId, DomainError, DomainResult, ProductId};

#[cfg_attr(test, mockall::automock)]
pub trait ProductCrudService: Send + Sync {
    fn create(&self, request: CreateProductRequest) -> DomainResult<Product>;
    /// Trashed products read as not found.
    fn get(&self, id: ProductId) -> DomainResult<Product>;
    fn get_by_slug(&self, slug: &str, increment_views: bool) -> DomainResult<Product>;
    /// Writes only the fields present in `request`.
    fn update(&self, id: ProductId, request: UpdateProductRequest) -> DomainResult<Product>;
    fn delete(&self, id: ProductId) -> DomainResult<Product>;
    fn restore(&self, id: ProductId) -> DomainResult<Product>;
    fn quick_edit(&self, id: ProductId, request: QuickEditProductRequest) -> DomainResult<Product>;
}

#[derive(Clone)]
pub struct ProductCrud {
    products: Arc<dyn ProductRepository>,
    categories: Arc<dyn CategoryRepository>,
}

impl ProductCrud {
    pub fn new(products: Arc<dyn ProductRepository>, categories: Arc<dyn CategoryRepository>) -> Self {
        Self {
            products,
            categories,
        }
    }

    fn ensure_category(&self, category_id: CategoryId) -> DomainResult<()> {
        if self.categories.find(category_id)?.is_none() {
            return Err(DomainError::field("category_id", "category does not exist"));
        }
        Ok(())
    }

    /// Shared validation for full and quick edits, then an atomic write.
    fn write_patch(&self, id: ProductId, patch: &ProductPatch) -> DomainResult<Product> {
        if let Some(Some(category_id)) = patch.category_id {
            self.ensure_category(category_id)?;
        }
        if let Some(slug) = &patch.slug {
            if self.products.slug_exists(slug, Some(id))? {
                return Err(DomainError::field("slug", "slug is already taken"));
            }
        }
        let now = Utc::now();
        self.products.modify(id, &mut |product: &mut Product| {
            if product.is_trashed() {
                return Err(DomainError::not_found("product"));
            }
            product.apply_patch(patch, now);
            Ok(())
        })
    }
}

impl ProductCrudService for ProductCrud {
    fn create(&self, request: CreateProductRequest) -> DomainResult<Product> {
        if let Some(category_id) = request.category_id {
            self.ensure_category(category_id)?;
        }

        let slug = match &request.slug {
            Some(slug) => {
                if self.products.slug_exists(slug, None)? {
                    return Err(DomainError::field("slug", "slug is already taken"));
                }
                slug.clone()
            }
            None => {
                let base = slugify(&request.name);
                if base.is_empty() {
                    return Err(DomainError::field("name", "name must contain letters or digits"));
                }
                unique_slug(&base, |candidate| self.products.slug_exists(candidate, None))?
            }
        };

        let product = self.products.insert(Product::create(&request, slug, Utc::now()))?;
        tracing::info!(product_id = %product.id, slug = %product.slug, "product created");
        Ok(product)
    }

    fn get(&self, id: ProductId) -> DomainResult<Product> {
        match self.products.find(id)? {
            Some(product) if !product.is_trashed() => Ok(product),
            _ => Err(DomainError::not_found("product")),
        }
    }

    fn get_by_slug(&self, slug: &str, increment_views: bool) -> DomainResult<Product> {
        let mut product = match self.products.find_by_slug(slug)? {
            Some(product) if !product.is_trashed() => product,
            _ => return Err(DomainError::not_found("product")),
        };
        if increment_views {
            product.view_count = self.products.increment_views(product.id)?;
        }
        Ok(product)
    }

    fn update(&self, id: ProductId, request: UpdateProductRequest) -> DomainResult<Product> {
        if request.is_empty() {
            return self.get(id);
        }
        let product = self.write_patch(id, request.patch())?;
        tracing::info!(
            product_id = %id,
            fields = ?request.changed_fields(),
            "product updated"
        );
        Ok(product)
    }

    fn delete(&self, id: ProductId) -> DomainResult<Product> {
        let now = Utc::now();
        let product = self
            .products
            .modify(id, &mut |product: &mut Product| product.soft_delete(now))?;
        tracing::info!(product_id = %id, "product moved to trash");
        Ok(product)
    }

    /// A category deleted while the product sat in the trash is detached.
    fn restore(&self, id: ProductId) -> DomainResult<Product> {
        let current = self
            .products
            .find(id)?
            .ok_or_else(|| DomainError::not_found("product"))?;
        let orphaned = match current.category_id {
            Some(category_id) => self.categories.find(category_id)?.is_none(),
            None => false,
        };

        let now = Utc::now();
        let product = self.products.modify(id, &mut |product: &mut Product| {
            product.restore(now)?;
            if orphaned {
                product.category_id = None;
            }
            Ok(())
        })?;
        if orphaned {
            tracing::warn!(product_id = %id, "restored product lost its deleted category");
        }
        tracing::info!(product_id = %id, "product restored");
        Ok(product)
    }

    fn quick_edit(&self, id: ProductId, request: QuickEditProductRequest) -> DomainResult<Product> {
        let product = self.write_patch(id, request.patch())?;
        tracing::info!(product_id = %id, "product quick-edited");
        Ok(product)
    }
}
