use std::sync::Arc;

use chrono::Utc;

use pricelens_core::{CategoryId, DomainError, DomainResult};

use crate::category::{
    build_tree, creates_cycle, Category, CategoryNode, CreateCategoryRequest, UpdateCategoryRequest,
};
use crate::repository::{CategoryRepository, ProductRepository};
use crate::slug::{slugify, unique_slug};

#[derive(Clone)]
pub struct CategoryService {
    categories: Arc<dyn CategoryRepository>,
    products: Arc<dyn ProductRepository>,
}

impl CategoryService {
    pub fn new(categories: Arc<dyn CategoryRepository>, products: Arc<dyn ProductRepository>) -> Self {
        Self {
            categories,
            products,
        }
    }

    fn visible(&self, active_only: bool) -> DomainResult<Vec<Category>> {
        let mut all = self.categories.all()?;
        if active_only {
            all.retain(|c| c.active);
        }
        all.sort_by(|a, b| {
            a.sort_order
                .cmp(&b.sort_order)
                .then_with(|| a.name.to_lowercase().cmp(&b.name.to_lowercase()))
        });
        Ok(all)
    }

    pub fn list(&self, active_only: bool) -> DomainResult<Vec<Category>> {
        self.visible(active_only)
    }

    pub fn tree(&self, active_only: bool) -> DomainResult<Vec<CategoryNode>> {
        Ok(build_tree(self.visible(active_only)?))
    }

    pub fn roots(&self, active_only: bool) -> DomainResult<Vec<Category>> {
        let mut all = self.visible(active_only)?;
        all.retain(Category::is_root);
        Ok(all)
    }

    pub fn children(&self, parent: CategoryId, active_only: bool) -> DomainResult<Vec<Category>> {
        self.get(parent)?;
        let mut children = self.categories.children(parent)?;
        if active_only {
            children.retain(|c| c.active);
        }
        children.sort_by(|a, b| a.sort_order.cmp(&b.sort_order).then_with(|| a.name.cmp(&b.name)));
        Ok(children)
    }

    pub fn get(&self, id: CategoryId) -> DomainResult<Category> {
        self.categories
            .find(id)?
            .ok_or_else(|| DomainError::not_found("category"))
    }

    pub fn get_by_slug(&self, slug: &str) -> DomainResult<Category> {
        self.categories
            .find_by_slug(slug)?
            .ok_or_else(|| DomainError::not_found("category"))
    }

    pub fn exists(&self, id: CategoryId) -> DomainResult<bool> {
        Ok(self.categories.find(id)?.is_some())
    }

    pub fn create(&self, request: CreateCategoryRequest) -> DomainResult<Category> {
        if let Some(parent) = request.parent_id {
            if !self.exists(parent)? {
                return Err(DomainError::field("parent_id", "parent category does not exist"));
            }
        }

        let slug = match &request.slug {
            Some(slug) => {
                if self.categories.slug_exists(slug, None)? {
                    return Err(DomainError::field("slug", "slug is already taken"));
                }
                slug.clone()
            }
            None => {
                let base = slugify(&request.name);
                if base.is_empty() {
                    return Err(DomainError::field("name", "name must contain letters or digits"));
                }
                unique_slug(&base, |s| self.categories.slug_exists(s, None))?
            }
        };

        let category = self
            .categories
            .insert(Category::create(&request, slug, Utc::now()))?;
        tracing::info!(category_id = %category.id, slug = %category.slug, "category created");
        Ok(category)
    }

    pub fn update(&self, id: CategoryId, request: UpdateCategoryRequest) -> DomainResult<Category> {
        let mut category = self.get(id)?;

        if let Some(Some(parent)) = request.parent_id {
            if !self.exists(parent)? {
                return Err(DomainError::field("parent_id", "parent category does not exist"));
            }
            if creates_cycle(&self.categories.all()?, id, parent) {
                return Err(DomainError::conflict(
                    "a category cannot be moved below itself or one of its descendants",
                ));
            }
        }

        if let Some(slug) = &request.slug {
            if self.categories.slug_exists(slug, Some(id))? {
                return Err(DomainError::field("slug", "slug is already taken"));
            }
        }

        category.apply(&request, Utc::now());
        self.categories.save(category.clone())?;
        tracing::info!(category_id = %id, "category updated");
        Ok(category)
    }

    /// Refused while the category still has subcategories or products.
    pub fn delete(&self, id: CategoryId) -> DomainResult<Category> {
        let category = self.get(id)?;
        if !self.categories.children(id)?.is_empty() {
            return Err(DomainError::conflict("category still has subcategories"));
        }
        let products = self.products.count_in_category(id)?;
        if products > 0 {
            return Err(DomainError::conflict(format!(
                "category still has {products} product(s)"
            )));
        }
        self.categories.delete(id)?;
        tracing::info!(category_id = %id, "category deleted");
        Ok(category)
    }
}
