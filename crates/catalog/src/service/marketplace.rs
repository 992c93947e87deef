use std::sync::Arc;

use chrono::Utc;

use pricelens_core::{DomainError, DomainResult, MarketplaceId};

use crate::marketplace::{default_marketplaces, CreateMarketplaceRequest, Marketplace};
use crate::repository::MarketplaceRepository;

#[derive(Clone)]
pub struct MarketplaceService {
    marketplaces: Arc<dyn MarketplaceRepository>,
}

impl MarketplaceService {
    pub fn new(marketplaces: Arc<dyn MarketplaceRepository>) -> Self {
        Self { marketplaces }
    }

    pub fn list(&self, active_only: bool) -> DomainResult<Vec<Marketplace>> {
        let mut all = self.marketplaces.all()?;
        if active_only {
            all.retain(|m| m.active);
        }
        all.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(all)
    }

    pub fn get(&self, id: MarketplaceId) -> DomainResult<Marketplace> {
        self.marketplaces
            .find(id)?
            .ok_or_else(|| DomainError::not_found("marketplace"))
    }

    pub fn create(&self, request: CreateMarketplaceRequest) -> DomainResult<Marketplace> {
        if self.marketplaces.slug_exists(&request.slug)? {
            return Err(DomainError::conflict(format!(
                "marketplace `{}` already exists",
                request.slug
            )));
        }
        let marketplace = self.marketplaces.insert(Marketplace::create(&request, Utc::now()))?;
        tracing::info!(marketplace_id = %marketplace.id, slug = %marketplace.slug, "marketplace created");
        Ok(marketplace)
    }

    /// Insert the default marketplaces that are not present yet.
    pub fn seed_defaults(&self) -> DomainResult<usize> {
        let mut inserted = 0;
        for request in default_marketplaces() {
            if !self.marketplaces.slug_exists(&request.slug)? {
                self.marketplaces.insert(Marketplace::create(&request, Utc::now()))?;
                inserted += 1;
            }
        }
        Ok(inserted)
    }
}
