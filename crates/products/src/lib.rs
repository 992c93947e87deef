//! Product services.
//!
//! Four sub-services each own one family of product operations; the
//! [`ProductOrchestrator`] exposes all of them behind a single interface.

pub mod bulk;
pub mod crud;
pub mod orchestrator;
pub mod query;
pub mod workflow;

#[cfg(test)]
mod test_support;

pub use bulk::{ProductBulk, ProductBulkService};
pub use crud::{ProductCrud, ProductCrudService};
pub use orchestrator::{
    ProductOrchestrator, ProductOrchestratorInterface, ServiceHealth, SubServiceHealth,
};
pub use query::{ProductQueries, ProductQueryService};
pub use workflow::{ProductWorkflow, ProductWorkflowService};
