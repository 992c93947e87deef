//! Multi-id actions applied one product at a time.

use std::sync::Arc;

use pricelens_catalog::{BulkAction, BulkActionRequest, BulkActionResult};
use pricelens_core::{AdminId, DomainResult, ProductId};

use crate::crud::ProductCrudService;
use crate::workflow::ProductWorkflowService;

#[cfg_attr(test, mockall::automock)]
pub trait ProductBulkService: Send + Sync {
    /// Applies `request.action` to each id independently. Per-id failures are
    /// collected in the result and never abort the batch.
    fn execute(&self, request: BulkActionRequest, actor: AdminId) -> DomainResult<BulkActionResult>;
}

#[derive(Clone)]
pub struct ProductBulk {
    crud: Arc<dyn ProductCrudService>,
    workflow: Arc<dyn ProductWorkflowService>,
}

impl ProductBulk {
    pub fn new(crud: Arc<dyn ProductCrudService>, workflow: Arc<dyn ProductWorkflowService>) -> Self {
        Self { crud, workflow }
    }

    fn apply(&self, action: BulkAction, id: ProductId, actor: AdminId) -> DomainResult<()> {
        match action {
            BulkAction::Publish => self.workflow.publish(id),
            BulkAction::Archive => self.workflow.archive(id),
            BulkAction::Unarchive => self.workflow.unarchive(id),
            BulkAction::Verify => self.workflow.verify(id, actor),
            BulkAction::RevertToDraft => self.workflow.revert_to_draft(id),
            BulkAction::Delete => self.crud.delete(id),
            BulkAction::Restore => self.crud.restore(id),
        }
        .map(|_| ())
    }
}

impl ProductBulkService for ProductBulk {
    fn execute(&self, request: BulkActionRequest, actor: AdminId) -> DomainResult<BulkActionResult> {
        let mut result = BulkActionResult::new(request.action, request.ids.len());
        for id in request.ids {
            match self.apply(request.action, id, actor) {
                Ok(()) => result.record_success(id),
                Err(err) => {
                    tracing::warn!(product_id = %id, action = %request.action, error = %err, "bulk item failed");
                    result.record_failure(id, err.to_string());
                }
            }
        }
        tracing::info!(
            action = %request.action,
            succeeded = result.success_count(),
            failed = result.failure_count(),
            "bulk action finished"
        );
        Ok(result)
    }
}
