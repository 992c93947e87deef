use std::sync::Arc;

use chrono::Utc;
use serde_json::Value;

use pricelens_catalog::repository::CategoryRepository;
use pricelens_catalog::{Category, CreateCategoryRequest, CreateProductRequest, Price, Product};
use pricelens_core::{AdminId, CategoryId, RawInput};
use pricelens_infra::{InMemoryCategoryRepository, InMemoryProductRepository};

use crate::{
    ProductBulk, ProductCrud, ProductCrudService, ProductQueries, ProductWorkflow,
    ProductWorkflowService,
};

pub fn raw(value: Value) -> RawInput {
    value.as_object().cloned().unwrap()
}

pub fn create_request(name: &str, price: u64) -> CreateProductRequest {
    CreateProductRequest {
        name: name.to_string(),
        slug: None,
        description: None,
        price: Price::new(price).unwrap(),
        category_id: None,
        image: None,
    }
}

/// Real sub-services over fresh in-memory stores.
pub struct Fixture {
    pub categories: Arc<InMemoryCategoryRepository>,
    pub crud: Arc<ProductCrud>,
    pub workflow: Arc<ProductWorkflow>,
    pub queries: ProductQueries,
    pub bulk: ProductBulk,
}

impl Fixture {
    pub fn new() -> Self {
        let products = Arc::new(InMemoryProductRepository::new());
        let categories = Arc::new(InMemoryCategoryRepository::new());
        let crud = Arc::new(ProductCrud::new(products.clone(), categories.clone()));
        let workflow = Arc::new(ProductWorkflow::new(products.clone()));
        Self {
            queries: ProductQueries::new(products),
            bulk: ProductBulk::new(crud.clone(), workflow.clone()),
            categories,
            crud,
            workflow,
        }
    }

    pub fn category(&self, name: &str) -> CategoryId {
        let request = CreateCategoryRequest {
            name: name.to_string(),
            slug: None,
            parent_id: None,
            icon: None,
            sort_order: 0,
            active: true,
        };
        let category = Category::create(
            &request,
            pricelens_catalog::slug::slugify(name),
            Utc::now(),
        );
        self.categories.insert(category).unwrap().id
    }

    /// Create and walk a product all the way to `published`.
    pub fn published(&self, name: &str, price: u64) -> Product {
        let product = self.crud.create(create_request(name, price)).unwrap();
        self.workflow.request_verification(product.id).unwrap();
        self.workflow.verify(product.id, AdminId::new()).unwrap();
        self.workflow.publish(product.id).unwrap()
    }
}
