use std::sync::Arc;

use chrono::Utc;

use pricelens_core::{DomainError, DomainResult, LinkId, MarketplaceId, ProductId};

use crate::link::{lowest_price, CreateLinkRequest, Link, UpdateLinkRequest};
use crate::repository::{LinkRepository, MarketplaceRepository, ProductRepository};

#[derive(Clone)]
pub struct LinkService {
    links: Arc<dyn LinkRepository>,
    products: Arc<dyn ProductRepository>,
    marketplaces: Arc<dyn MarketplaceRepository>,
}

impl LinkService {
    pub fn new(
        links: Arc<dyn LinkRepository>,
        products: Arc<dyn ProductRepository>,
        marketplaces: Arc<dyn MarketplaceRepository>,
    ) -> Self {
        Self {
            links,
            products,
            marketplaces,
        }
    }

    fn ensure_product(&self, product_id: ProductId) -> DomainResult<()> {
        match self.products.find(product_id)? {
            Some(p) if !p.is_trashed() => Ok(()),
            _ => Err(DomainError::not_found("product")),
        }
    }

    fn ensure_marketplace(&self, marketplace_id: MarketplaceId) -> DomainResult<()> {
        match self.marketplaces.find(marketplace_id)? {
            Some(_) => Ok(()),
            None => Err(DomainError::field("marketplace_id", "marketplace does not exist")),
        }
    }

    /// Offers for a product, cheapest first.
    pub fn for_product(&self, product_id: ProductId, active_only: bool) -> DomainResult<Vec<Link>> {
        let mut links = self.links.for_product(product_id)?;
        if active_only {
            links.retain(|l| l.active);
        }
        links.sort_by(|a, b| a.price.cmp(&b.price).then_with(|| a.id.cmp(&b.id)));
        Ok(links)
    }

    pub fn lowest_price(&self, product_id: ProductId) -> DomainResult<Option<u64>> {
        Ok(lowest_price(&self.links.for_product(product_id)?))
    }

    pub fn get(&self, id: LinkId) -> DomainResult<Link> {
        self.links.find(id)?.ok_or_else(|| DomainError::not_found("link"))
    }

    pub fn create(&self, product_id: ProductId, request: CreateLinkRequest) -> DomainResult<Link> {
        self.ensure_product(product_id)?;
        self.ensure_marketplace(request.marketplace_id)?;
        let link = self.links.insert(Link::create(product_id, &request, Utc::now()))?;
        tracing::info!(link_id = %link.id, product_id = %product_id, price = link.price, "link created");
        Ok(link)
    }

    pub fn update(&self, id: LinkId, request: UpdateLinkRequest) -> DomainResult<Link> {
        if let Some(marketplace_id) = request.marketplace_id {
            self.ensure_marketplace(marketplace_id)?;
        }
        let now = Utc::now();
        let link = self.links.modify(id, &mut |link: &mut Link| {
            link.apply(&request, now);
            Ok(())
        })?;
        tracing::info!(link_id = %id, "link updated");
        Ok(link)
    }

    pub fn delete(&self, id: LinkId) -> DomainResult<Link> {
        let link = self.get(id)?;
        self.links.delete(id)?;
        tracing::info!(link_id = %id, "link deleted");
        Ok(link)
    }

    /// Count an outbound storefront click. Inactive links, and links of
    /// products that are not public, are not clickable.
    pub fn record_click(&self, id: LinkId) -> DomainResult<Link> {
        let link = self.get(id)?;
        match self.products.find(link.product_id)? {
            Some(product) if product.is_public() => {}
            _ => return Err(DomainError::not_found("link")),
        }
        self.links.modify(id, &mut |link: &mut Link| {
            if !link.active {
                return Err(DomainError::not_found("link"));
            }
            link.clicks += 1;
            Ok(())
        })
    }
}
