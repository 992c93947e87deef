//! Single entry point for every product operation.
//!
//! Each method hands its arguments unchanged to the owning sub-service. No
//! caching, transactions or extra rules are added at this layer.

use std::collections::BTreeMap;
use std::sync::Arc;

use serde::Serialize;

use pricelens_catalog::{
    BulkActionRequest, BulkActionResult, CreateProductRequest, Product, ProductQuery,
    ProductStatus, QuickEditProductRequest, UpdateProductRequest,
};
use pricelens_core::{AdminId, DomainResult, Page, ProductId};

use crate::bulk::ProductBulkService;
use crate::crud::ProductCrudService;
use crate::query::ProductQueryService;
use crate::workflow::ProductWorkflowService;

pub const OPERATIONAL: &str = "operational";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SubServiceHealth {
    pub name: &'static str,
    pub status: &'static str,
}

/// Static descriptor of the façade and its sub-services. This is not a probe.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ServiceHealth {
    pub orchestrator: &'static str,
    pub services: Vec<SubServiceHealth>,
}

pub trait ProductOrchestratorInterface: Send + Sync {
    fn create_product(&self, request: CreateProductRequest) -> DomainResult<Product>;
    fn get_product(&self, id: ProductId) -> DomainResult<Product>;
    fn get_product_by_slug(&self, slug: &str, increment_views: bool) -> DomainResult<Product>;
    fn update_product(&self, id: ProductId, request: UpdateProductRequest) -> DomainResult<Product>;
    fn delete_product(&self, id: ProductId) -> DomainResult<Product>;
    fn restore_product(&self, id: ProductId) -> DomainResult<Product>;
    fn quick_edit_product(&self, id: ProductId, request: QuickEditProductRequest) -> DomainResult<Product>;

    fn publish_product(&self, id: ProductId) -> DomainResult<Product>;
    fn verify_product(&self, id: ProductId, verifier: AdminId) -> DomainResult<Product>;
    fn request_verification(&self, id: ProductId) -> DomainResult<Product>;
    fn archive_product(&self, id: ProductId) -> DomainResult<Product>;
    fn unarchive_product(&self, id: ProductId) -> DomainResult<Product>;
    fn toggle_product_status(&self, id: ProductId) -> DomainResult<Product>;
    fn revert_to_draft(&self, id: ProductId) -> DomainResult<Product>;

    fn list_products(&self, query: &ProductQuery, admin_mode: bool) -> DomainResult<Page<Product>>;
    fn search_products(&self, term: &str, limit: u32) -> DomainResult<Vec<Product>>;
    fn get_products_by_status(&self, status: ProductStatus, limit: u32) -> DomainResult<Vec<Product>>;
    fn count_products_by_status(&self) -> DomainResult<BTreeMap<ProductStatus, u64>>;

    fn bulk_action(&self, request: BulkActionRequest, actor: AdminId) -> DomainResult<BulkActionResult>;

    fn get_service_health(&self) -> ServiceHealth;
}

#[derive(Clone)]
pub struct ProductOrchestrator {
    crud: Arc<dyn ProductCrudService>,
    workflow: Arc<dyn ProductWorkflowService>,
    query: Arc<dyn ProductQueryService>,
    bulk: Arc<dyn ProductBulkService>,
}

impl ProductOrchestrator {
    pub fn new(
        crud: Arc<dyn ProductCrudService>,
        workflow: Arc<dyn ProductWorkflowService>,
        query: Arc<dyn ProductQueryService>,
        bulk: Arc<dyn ProductBulkService>,
    ) -> Self {
        Self {
            crud,
            workflow,
            query,
            bulk,
        }
    }
}

impl ProductOrchestratorInterface for ProductOrchestrator {
    fn create_product(&self, request: CreateProductRequest) -> DomainResult<Product> {
        self.crud.create(request)
    }

    fn get_product(&self, id: ProductId) -> DomainResult<Product> {
        self.crud.get(id)
    }

    fn get_product_by_slug(&self, slug: &str, increment_views: bool) -> DomainResult<Product> {
        self.crud.get_by_slug(slug, increment_views)
    }

    fn update_product(&self, id: ProductId, request: UpdateProductRequest) -> DomainResult<Product> {
        self.crud.update(id, request)
    }

    fn delete_product(&self, id: ProductId) -> DomainResult<Product> {
        self.crud.delete(id)
    }

    fn restore_product(&self, id: ProductId) -> DomainResult<Product> {
        self.crud.restore(id)
    }

    fn quick_edit_product(&self, id: ProductId, request: QuickEditProductRequest) -> DomainResult<Product> {
        self.crud.quick_edit(id, request)
    }

    fn publish_product(&self, id: ProductId) -> DomainResult<Product> {
        self.workflow.publish(id)
    }

    fn verify_product(&self, id: ProductId, verifier: AdminId) -> DomainResult<Product> {
        self.workflow.verify(id, verifier)
    }

    fn request_verification(&self, id: ProductId) -> DomainResult<Product> {
        self.workflow.request_verification(id)
    }

    fn archive_product(&self, id: ProductId) -> DomainResult<Product> {
        self.workflow.archive(id)
    }

    fn unarchive_product(&self, id: ProductId) -> DomainResult<Product> {
        self.workflow.unarchive(id)
    }

    fn toggle_product_status(&self, id: ProductId) -> DomainResult<Product> {
        self.workflow.toggle_status(id)
    }

    fn revert_to_draft(&self, id: ProductId) -> DomainResult<Product> {
        self.workflow.revert_to_draft(id)
    }

    fn list_products(&self, query: &ProductQuery, admin_mode: bool) -> DomainResult<Page<Product>> {
        self.query.list(query, admin_mode)
    }

    fn search_products(&self, term: &str, limit: u32) -> DomainResult<Vec<Product>> {
        self.query.search(term, limit)
    }

    fn get_products_by_status(&self, status: ProductStatus, limit: u32) -> DomainResult<Vec<Product>> {
        self.query.by_status(status, limit)
    }

    fn count_products_by_status(&self) -> DomainResult<BTreeMap<ProductStatus, u64>> {
        self.query.count_by_status()
    }

    fn bulk_action(&self, request: BulkActionRequest, actor: AdminId) -> DomainResult<BulkActionResult> {
        self.bulk.execute(request, actor)
    }

    fn get_service_health(&self) -> ServiceHealth {
        ServiceHealth {
            orchestrator: OPERATIONAL,
            services: ["crud", "workflow", "query", "bulk"]
                .into_iter()
                .map(|name| SubServiceHealth {
                    name,
                    status: OPERATIONAL,
                })
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bulk::MockProductBulkService;
    use crate::crud::MockProductCrudService;
    use crate::query::MockProductQueryService;
    use crate::test_support::{create_request, raw, Fixture};
    use crate::workflow::MockProductWorkflowService;
    use chrono::Utc;
    use mockall::predicate::eq;
    use pricelens_catalog::{BulkAction, QueryOverrides};
    use pricelens_core::{DomainError, PageRequest};
    use serde_json::json;

    #[derive(Default)]
    struct Mocks {
        crud: MockProductCrudService,
        workflow: MockProductWorkflowService,
        query: MockProductQueryService,
        bulk: MockProductBulkService,
    }

    impl Mocks {
        fn build(self) -> ProductOrchestrator {
            ProductOrchestrator::new(
                Arc::new(self.crud),
                Arc::new(self.workflow),
                Arc::new(self.query),
                Arc::new(self.bulk),
            )
        }
    }

    fn sample_product() -> Product {
        Product::create(&create_request("Mouse Wireless", 120_000), "mouse-wireless".into(), Utc::now())
    }

    #[test]
    fn create_passes_the_request_through() {
        let request = create_request("Keyboard Mekanik", 750_000);
        let product = sample_product();
        let returned = product.clone();

        let mut mocks = Mocks::default();
        mocks
            .crud
            .expect_create()
            .with(eq(request.clone()))
            .times(1)
            .return_once(move |_| Ok(returned));

        assert_eq!(mocks.build().create_product(request).unwrap(), product);
    }

    #[test]
    fn slug_lookup_passes_view_flag() {
        let mut mocks = Mocks::default();
        mocks
            .crud
            .expect_get_by_slug()
            .withf(|slug, increment| slug == "mouse-wireless" && *increment)
            .times(1)
            .returning(|_, _| Ok(sample_product()));

        mocks.build().get_product_by_slug("mouse-wireless", true).unwrap();
    }

    #[test]
    fn crud_errors_surface_unchanged() {
        let id = ProductId::new();
        let mut mocks = Mocks::default();
        mocks
            .crud
            .expect_delete()
            .with(eq(id))
            .times(1)
            .returning(|_| Err(DomainError::not_found("product")));
        mocks
            .crud
            .expect_restore()
            .with(eq(id))
            .times(1)
            .returning(|_| Err(DomainError::conflict("product is not deleted")));

        let orchestrator = mocks.build();
        assert_eq!(orchestrator.delete_product(id).unwrap_err(), DomainError::not_found("product"));
        assert_eq!(
            orchestrator.restore_product(id).unwrap_err(),
            DomainError::conflict("product is not deleted")
        );
    }

    #[test]
    fn update_and_quick_edit_go_to_crud() {
        let id = ProductId::new();
        let update = UpdateProductRequest::from_request(&raw(json!({"name": "Mouse Gaming"}))).unwrap();
        let quick = QuickEditProductRequest::from_request(&raw(json!({"price": 99000}))).unwrap();

        let mut mocks = Mocks::default();
        mocks
            .crud
            .expect_update()
            .with(eq(id), eq(update.clone()))
            .times(1)
            .returning(|_, _| Ok(sample_product()));
        mocks
            .crud
            .expect_quick_edit()
            .with(eq(id), eq(quick.clone()))
            .times(1)
            .returning(|_, _| Ok(sample_product()));
        mocks.crud.expect_get().with(eq(id)).times(1).returning(|_| Ok(sample_product()));

        let orchestrator = mocks.build();
        orchestrator.update_product(id, update).unwrap();
        orchestrator.quick_edit_product(id, quick).unwrap();
        orchestrator.get_product(id).unwrap();
    }

    #[test]
    fn every_workflow_call_hits_its_own_method() {
        let id = ProductId::new();
        let verifier = AdminId::new();

        let mut mocks = Mocks::default();
        let wf = &mut mocks.workflow;
        wf.expect_publish().with(eq(id)).times(1).returning(|_| Ok(sample_product()));
        wf.expect_verify()
            .with(eq(id), eq(verifier))
            .times(1)
            .returning(|_, _| Ok(sample_product()));
        wf.expect_request_verification().with(eq(id)).times(1).returning(|_| Ok(sample_product()));
        wf.expect_archive().with(eq(id)).times(1).returning(|_| Ok(sample_product()));
        wf.expect_unarchive().with(eq(id)).times(1).returning(|_| Ok(sample_product()));
        wf.expect_toggle_status().with(eq(id)).times(1).returning(|_| Ok(sample_product()));
        wf.expect_revert_to_draft().with(eq(id)).times(1).returning(|_| Ok(sample_product()));

        let orchestrator = mocks.build();
        orchestrator.publish_product(id).unwrap();
        orchestrator.verify_product(id, verifier).unwrap();
        orchestrator.request_verification(id).unwrap();
        orchestrator.archive_product(id).unwrap();
        orchestrator.unarchive_product(id).unwrap();
        orchestrator.toggle_product_status(id).unwrap();
        orchestrator.revert_to_draft(id).unwrap();
    }

    #[test]
    fn list_keeps_the_query_and_mode_unmodified() {
        let query = ProductQuery::new().with_search("kopi").with(QueryOverrides::public());
        let expected = query.clone();

        let mut mocks = Mocks::default();
        mocks
            .query
            .expect_list()
            .withf(move |q, admin| *q == expected && !*admin)
            .times(1)
            .returning(|_, _| Ok(PageRequest::default().paginate(Vec::new())));
        mocks
            .query
            .expect_search()
            .withf(|term, limit| term == "kopi" && *limit == 8)
            .times(1)
            .returning(|_, _| Ok(Vec::new()));
        mocks
            .query
            .expect_by_status()
            .with(eq(ProductStatus::PendingVerification), eq(5))
            .times(1)
            .returning(|_, _| Ok(Vec::new()));
        mocks
            .query
            .expect_count_by_status()
            .times(1)
            .returning(|| Ok(BTreeMap::new()));

        let orchestrator = mocks.build();
        orchestrator.list_products(&query, false).unwrap();
        orchestrator.search_products("kopi", 8).unwrap();
        orchestrator.get_products_by_status(ProductStatus::PendingVerification, 5).unwrap();
        orchestrator.count_products_by_status().unwrap();
    }

    #[test]
    fn bulk_goes_to_bulk_service() {
        let request = BulkActionRequest::new(BulkAction::Archive, vec![ProductId::new()]).unwrap();
        let actor = AdminId::new();

        let mut mocks = Mocks::default();
        mocks
            .bulk
            .expect_execute()
            .with(eq(request.clone()), eq(actor))
            .times(1)
            .returning(|req, _| Ok(BulkActionResult::new(req.action, req.ids.len())));

        let result = mocks.build().bulk_action(request, actor).unwrap();
        assert_eq!(result.action, BulkAction::Archive);
        assert_eq!(result.requested, 1);
    }

    #[test]
    fn health_lists_all_sub_services() {
        let health = Mocks::default().build().get_service_health();
        assert_eq!(health.orchestrator, OPERATIONAL);
        let names: Vec<_> = health.services.iter().map(|s| s.name).collect();
        assert_eq!(names, vec!["crud", "workflow", "query", "bulk"]);
        assert!(health.services.iter().all(|s| s.status == OPERATIONAL));
    }

    #[test]
    fn wired_with_real_services() {
        let fx = Fixture::new();
        let orchestrator = ProductOrchestrator::new(
            fx.crud.clone(),
            fx.workflow.clone(),
            Arc::new(fx.queries.clone()),
            Arc::new(fx.bulk.clone()),
        );

        let product = orchestrator.create_product(create_request("Earbuds TWS", 199_000)).unwrap();
        orchestrator.request_verification(product.id).unwrap();
        orchestrator.verify_product(product.id, AdminId::new()).unwrap();
        orchestrator.publish_product(product.id).unwrap();

        let public = ProductQuery::new().with(QueryOverrides::public());
        let page = orchestrator.list_products(&public, false).unwrap();
        assert_eq!(page.items.len(), 1);
        assert_eq!(orchestrator.search_products("earbuds", 5).unwrap().len(), 1);
    }
}
