//! Service wiring: in-memory stores, domain services and first-run seeding.

use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use serde_json::{json, Value};

use pricelens_auth::{AccountService, Hs256JwtIssuer, Hs256JwtValidator};
use pricelens_catalog::{
    Category, CategoryService, Link, LinkService, Marketplace, MarketplaceService, Product,
    ProductStatus,
};
use pricelens_core::{AdminId, DomainResult, MarketplaceId};
use pricelens_infra::{
    AuditService, InMemoryAdminRepository, InMemoryAuditLog, InMemoryCategoryRepository,
    InMemoryLinkRepository, InMemoryMarketplaceRepository, InMemoryProductRepository,
    InMemoryRoleRepository, NewAuditLog,
};
use pricelens_products::{
    ProductBulk, ProductCrud, ProductOrchestrator, ProductOrchestratorInterface, ProductQueries,
    ProductWorkflow,
};

use crate::config::ApiConfig;

/// Everything a handler can reach.
#[derive(Clone)]
pub struct AppServices {
    pub products: Arc<dyn ProductOrchestratorInterface>,
    pub categories: CategoryService,
    pub links: LinkService,
    pub marketplaces: MarketplaceService,
    pub accounts: AccountService,
    pub audit: AuditService,
    pub jwt: Arc<Hs256JwtValidator>,
    pub started_at: DateTime<Utc>,
}

/// Wire services over fresh in-memory stores and seed roles, marketplaces and
/// the bootstrap super-admin.
pub fn build_services(config: &ApiConfig) -> anyhow::Result<AppServices> {
    let product_repo = Arc::new(InMemoryProductRepository::new());
    let category_repo = Arc::new(InMemoryCategoryRepository::new());
    let marketplace_repo = Arc::new(InMemoryMarketplaceRepository::new());

    let crud = Arc::new(ProductCrud::new(product_repo.clone(), category_repo.clone()));
    let workflow = Arc::new(ProductWorkflow::new(product_repo.clone()));
    let queries = Arc::new(ProductQueries::new(product_repo.clone()));
    let bulk = Arc::new(ProductBulk::new(crud.clone(), workflow.clone()));
    let products: Arc<dyn ProductOrchestratorInterface> =
        Arc::new(ProductOrchestrator::new(crud, workflow, queries, bulk));

    let issuer = Arc::new(Hs256JwtIssuer::new(
        config.jwt_secret.as_bytes(),
        Duration::minutes(config.jwt_ttl_minutes),
    ));
    let accounts = AccountService::new(
        Arc::new(InMemoryAdminRepository::new()),
        Arc::new(InMemoryRoleRepository::new()),
        issuer,
    );

    let services = AppServices {
        products,
        categories: CategoryService::new(category_repo, product_repo.clone()),
        links: LinkService::new(
            Arc::new(InMemoryLinkRepository::new()),
            product_repo,
            marketplace_repo.clone(),
        ),
        marketplaces: MarketplaceService::new(marketplace_repo),
        accounts,
        audit: AuditService::new(Arc::new(InMemoryAuditLog::new())),
        jwt: Arc::new(Hs256JwtValidator::new(config.jwt_secret.as_bytes())),
        started_at: Utc::now(),
    };

    let roles = services.accounts.seed_roles()?;
    let marketplaces = services.marketplaces.seed_defaults()?;
    let admin = services.accounts.ensure_super_admin(
        &config.admin.username,
        &config.admin.email,
        &config.admin.password,
    )?;
    tracing::info!(
        roles,
        marketplaces,
        super_admin_created = admin.is_some(),
        "seed data ensured"
    );

    Ok(services)
}

impl AppServices {
    /// Record an audit entry. A failure is logged, never surfaced to the caller.
    pub fn record_audit(
        &self,
        actor: AdminId,
        action: &str,
        entity_type: &str,
        entity_id: impl ToString,
        old: Option<Value>,
        new: Option<Value>,
    ) {
        let mut entry = NewAuditLog::new(actor, action, entity_type).entity(entity_id);
        if let Some(old) = old {
            entry = entry.old(old);
        }
        if let Some(new) = new {
            entry = entry.new_values(new);
        }
        if let Err(e) = self.audit.record(entry) {
            tracing::error!(error = %e, action, "failed to record audit entry");
        }
    }

    /// Category, active offers (cheapest first, with their marketplace) and the
    /// lowest active price for a product page.
    pub fn product_detail(
        &self,
        product: &Product,
    ) -> DomainResult<(Option<Category>, Vec<(Link, Option<Marketplace>)>, Option<u64>)> {
        let category = match product.category_id {
            Some(id) => self.categories.get(id).ok(),
            None => None,
        };
        let links = self.links.for_product(product.id, true)?;
        let lowest = self.links.lowest_price(product.id)?;
        let with_marketplaces = links
            .into_iter()
            .map(|link| {
                let marketplace = self.marketplace(link.marketplace_id);
                (link, marketplace)
            })
            .collect();
        Ok((category, with_marketplaces, lowest))
    }

    pub fn marketplace(&self, id: MarketplaceId) -> Option<Marketplace> {
        self.marketplaces.get(id).ok()
    }

    /// Counters for the back-office dashboard.
    pub fn dashboard_stats(&self) -> DomainResult<Value> {
        let by_status = self.products.count_products_by_status()?;
        let total: u64 = by_status.values().sum();
        let counts: serde_json::Map<String, Value> = by_status
            .iter()
            .map(|(status, count)| (status.as_str().to_string(), json!(count)))
            .collect();
        let recent = self
            .products
            .get_products_by_status(ProductStatus::PendingVerification, 5)?;

        Ok(json!({
            "products": {
                "total": total,
                "by_status": counts,
            },
            "pending_verification": recent
                .iter()
                .map(|p| json!({"id": p.id.to_string(), "name": p.name, "slug": p.slug}))
                .collect::<Vec<_>>(),
            "categories": self.categories.list(false)?.len(),
            "marketplaces": self.marketplaces.list(true)?.len(),
            "admins": self.accounts.list_admins()?.len(),
        }))
    }
}
