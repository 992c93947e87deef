//! Status transitions.

use std::sync::Arc;

use chrono::{DateTime, Utc};

use pricelens_catalog::repository::ProductRepository;
use pricelens_catalog::Product;
use pricelens_core::{AdminId, DomainResult, ProductId};

#[cfg_attr(test, mockall::automock)]
pub trait ProductWorkflowService: Send + Sync {
    fn request_verification(&self, id: ProductId) -> DomainResult<Product>;
    fn verify(&self, id: ProductId, verifier: AdminId) -> DomainResult<Product>;
    fn publish(&self, id: ProductId) -> DomainResult<Product>;
    fn archive(&self, id: ProductId) -> DomainResult<Product>;
    fn unarchive(&self, id: ProductId) -> DomainResult<Product>;
    /// Published ⇄ archived.
    fn toggle_status(&self, id: ProductId) -> DomainResult<Product>;
    fn revert_to_draft(&self, id: ProductId) -> DomainResult<Product>;
}

#[derive(Clone)]
pub struct ProductWorkflow {
    products: Arc<dyn ProductRepository>,
}

impl ProductWorkflow {
    pub fn new(products: Arc<dyn ProductRepository>) -> Self {
        Self { products }
    }

    fn transition(
        &self,
        id: ProductId,
        action: &'static str,
        apply: impl Fn(&mut Product, DateTime<Utc>) -> DomainResult<()>,
    ) -> DomainResult<Product> {
        let now = Utc::now();
        let from = self.products.find(id)?.map(|p| p.status);
        let product = self
            .products
            .modify(id, &mut |product: &mut Product| apply(product, now))?;
        tracing::info!(
            product_id = %id,
            action,
            from = ?from,
            to = %product.status,
            "product status changed"
        );
        Ok(product)
    }
}

impl ProductWorkflowService for ProductWorkflow {
    fn request_verification(&self, id: ProductId) -> DomainResult<Product> {
        self.transition(id, "request_verification", |p, now| p.request_verification(now))
    }

    fn verify(&self, id: ProductId, verifier: AdminId) -> DomainResult<Product> {
        self.transition(id, "verify", |p, now| p.verify(verifier, now))
    }

    fn publish(&self, id: ProductId) -> DomainResult<Product> {
        self.transition(id, "publish", |p, now| p.publish(now))
    }

    fn archive(&self, id: ProductId) -> DomainResult<Product> {
        self.transition(id, "archive", |p, now| p.archive(now))
    }

    fn unarchive(&self, id: ProductId) -> DomainResult<Product> {
        self.transition(id, "unarchive", |p, now| p.unarchive(now))
    }

    fn toggle_status(&self, id: ProductId) -> DomainResult<Product> {
        self.transition(id, "toggle_status", |p, now| p.toggle_status(now).map(|_| ()))
    }

    fn revert_to_draft(&self, id: ProductId) -> DomainResult<Product> {
        self.transition(id, "revert_to_draft", |p, now| p.revert_to_draft(now))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{create_request, Fixture};
    use crate::ProductCrudService;
    use pricelens_catalog::ProductStatus;
    use pricelens_core::DomainError;

    #[test]
    fn verification_records_the_verifier() {
        let fx = Fixture::new();
        let product = fx.crud.create(create_request("Rice Cooker", 650_000)).unwrap();
        let verifier = AdminId::new();

        fx.workflow.request_verification(product.id).unwrap();
        let verified = fx.workflow.verify(product.id, verifier).unwrap();

        assert_eq!(verified.status, ProductStatus::Verified);
        assert_eq!(verified.verified_by, Some(verifier));
    }

    #[test]
    fn illegal_transitions_conflict() {
        let fx = Fixture::new();
        let product = fx.crud.create(create_request("Blender", 400_000)).unwrap();

        assert!(matches!(fx.workflow.publish(product.id), Err(DomainError::Conflict(_))));
        assert!(matches!(fx.workflow.verify(product.id, AdminId::new()), Err(DomainError::Conflict(_))));
        assert!(matches!(fx.workflow.unarchive(product.id), Err(DomainError::Conflict(_))));
        assert!(matches!(fx.workflow.toggle_status(product.id), Err(DomainError::Conflict(_))));
    }

    #[test]
    fn toggle_round_trips_published_products() {
        let fx = Fixture::new();
        let product = fx.published("Kulkas 2 Pintu", 4_500_000);

        assert_eq!(fx.workflow.toggle_status(product.id).unwrap().status, ProductStatus::Archived);
        assert_eq!(fx.workflow.toggle_status(product.id).unwrap().status, ProductStatus::Published);
    }

    #[test]
    fn archived_draft_cannot_toggle_but_can_unarchive() {
        let fx = Fixture::new();
        let product = fx.crud.create(create_request("Setrika Uap", 350_000)).unwrap();
        fx.workflow.archive(product.id).unwrap();

        assert!(matches!(fx.workflow.toggle_status(product.id), Err(DomainError::Conflict(_))));
        assert_eq!(fx.workflow.unarchive(product.id).unwrap().status, ProductStatus::Draft);
    }

    #[test]
    fn revert_clears_verification() {
        let fx = Fixture::new();
        let product = fx.published("Mesin Cuci", 3_200_000);

        let reverted = fx.workflow.revert_to_draft(product.id).unwrap();
        assert_eq!(reverted.status, ProductStatus::Draft);
        assert!(reverted.verified_by.is_none());
        assert!(matches!(fx.workflow.revert_to_draft(product.id), Err(DomainError::Conflict(_))));
    }

    #[test]
    fn reverted_product_cannot_toggle_back_to_published() {
        let fx = Fixture::new();
        let product = fx.published("Dispenser Air", 1_150_000);

        fx.workflow.revert_to_draft(product.id).unwrap();
        let archived = fx.workflow.archive(product.id).unwrap();
        assert!(archived.published_at.is_none());

        assert!(matches!(fx.workflow.toggle_status(product.id), Err(DomainError::Conflict(_))));
        assert_eq!(fx.crud.get(product.id).unwrap().status, ProductStatus::Archived);
    }

    #[test]
    fn trashed_and_missing_products_are_not_found() {
        let fx = Fixture::new();
        let product = fx.crud.create(create_request("Kipas Angin", 250_000)).unwrap();
        fx.crud.delete(product.id).unwrap();

        assert!(fx.workflow.archive(product.id).unwrap_err().is_not_found());
        assert!(fx.workflow.publish(ProductId::new()).unwrap_err().is_not_found());
    }
}
