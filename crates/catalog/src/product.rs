use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use pricelens_core::{AdminId, CategoryId, DomainError, DomainResult, Entity, ProductId};

use crate::requests::{CreateProductRequest, ProductPatch};

/// Product status lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProductStatus {
    Draft,
    PendingVerification,
    Verified,
    Published,
    Archived,
}

impl ProductStatus {
    pub const ALL: [ProductStatus; 5] = [
        ProductStatus::Draft,
        ProductStatus::PendingVerification,
        ProductStatus::Verified,
        ProductStatus::Published,
        ProductStatus::Archived,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ProductStatus::Draft => "draft",
            ProductStatus::PendingVerification => "pending_verification",
            ProductStatus::Verified => "verified",
            ProductStatus::Published => "published",
            ProductStatus::Archived => "archived",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            ProductStatus::Draft => "Draft",
            ProductStatus::PendingVerification => "Pending verification",
            ProductStatus::Verified => "Verified",
            ProductStatus::Published => "Published",
            ProductStatus::Archived => "Archived",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        let needle = s.trim().to_ascii_lowercase();
        Self::ALL.into_iter().find(|status| status.as_str() == needle)
    }
}

impl core::fmt::Display for ProductStatus {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A catalog product whose marketplace offers are compared.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    pub id: ProductId,
    pub slug: String,
    pub name: String,
    pub description: Option<String>,
    /// Reference price in rupiah.
    pub price: u64,
    pub category_id: Option<CategoryId>,
    /// Stored image path or URL (upload processing is out of process).
    pub image: Option<String>,
    pub status: ProductStatus,
    pub view_count: u64,
    pub verified_by: Option<AdminId>,
    pub verified_at: Option<DateTime<Utc>>,
    pub published_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub deleted_at: Option<DateTime<Utc>>,
}

impl Entity for Product {
    type Id = ProductId;

    fn id(&self) -> ProductId {
        self.id
    }
}

impl Product {
    /// New draft product. `slug` must already be unique.
    pub fn create(request: &CreateProductRequest, slug: String, now: DateTime<Utc>) -> Self {
        Self {
            id: ProductId::new(),
            slug,
            name: request.name.clone(),
            description: request.description.clone(),
            price: request.price.amount(),
            category_id: request.category_id,
            image: request.image.clone(),
            status: ProductStatus::Draft,
            view_count: 0,
            verified_by: None,
            verified_at: None,
            published_at: None,
            created_at: now,
            updated_at: now,
            deleted_at: None,
        }
    }

    pub fn is_trashed(&self) -> bool {
        self.deleted_at.is_some()
    }

    /// Visible on the storefront.
    pub fn is_public(&self) -> bool {
        self.status == ProductStatus::Published && !self.is_trashed()
    }

    /// Apply only the fields present in `patch`.
    pub fn apply_patch(&mut self, patch: &ProductPatch, now: DateTime<Utc>) {
        if let Some(name) = &patch.name {
            self.name = name.clone();
        }
        if let Some(slug) = &patch.slug {
            self.slug = slug.clone();
        }
        if let Some(description) = &patch.description {
            self.description = description.clone();
        }
        if let Some(price) = patch.price {
            self.price = price.amount();
        }
        if let Some(category_id) = patch.category_id {
            self.category_id = category_id;
        }
        if let Some(image) = &patch.image {
            self.image = image.clone();
        }
        self.updated_at = now;
    }

    fn ensure_not_trashed(&self) -> DomainResult<()> {
        if self.is_trashed() {
            return Err(DomainError::not_found("product"));
        }
        Ok(())
    }

    fn transition_error(&self, action: &str) -> DomainError {
        DomainError::conflict(format!(
            "cannot {action} a product that is {}",
            self.status.label().to_lowercase()
        ))
    }

    fn set_status(&mut self, status: ProductStatus, now: DateTime<Utc>) {
        self.status = status;
        self.updated_at = now;
    }

    pub fn request_verification(&mut self, now: DateTime<Utc>) -> DomainResult<()> {
        self.ensure_not_trashed()?;
        if self.status != ProductStatus::Draft {
            return Err(self.transition_error("request verification for"));
        }
        self.set_status(ProductStatus::PendingVerification, now);
        Ok(())
    }

    pub fn verify(&mut self, verifier: AdminId, now: DateTime<Utc>) -> DomainResult<()> {
        self.ensure_not_trashed()?;
        if self.status != ProductStatus::PendingVerification {
            return Err(self.transition_error("verify"));
        }
        self.verified_by = Some(verifier);
        self.verified_at = Some(now);
        self.set_status(ProductStatus::Verified, now);
        Ok(())
    }

    pub fn publish(&mut self, now: DateTime<Utc>) -> DomainResult<()> {
        self.ensure_not_trashed()?;
        if self.status != ProductStatus::Verified {
            return Err(self.transition_error("publish"));
        }
        self.published_at = Some(now);
        self.set_status(ProductStatus::Published, now);
        Ok(())
    }

    pub fn archive(&mut self, now: DateTime<Utc>) -> DomainResult<()> {
        self.ensure_not_trashed()?;
        if self.status == ProductStatus::Archived {
            return Err(DomainError::conflict("product is already archived"));
        }
        self.set_status(ProductStatus::Archived, now);
        Ok(())
    }

    pub fn unarchive(&mut self, now: DateTime<Utc>) -> DomainResult<()> {
        self.ensure_not_trashed()?;
        if self.status != ProductStatus::Archived {
            return Err(self.transition_error("unarchive"));
        }
        self.clear_publication();
        self.set_status(ProductStatus::Draft, now);
        Ok(())
    }

    /// Back in draft, the product has to go through verification again.
    fn clear_publication(&mut self) {
        self.verified_by = None;
        self.verified_at = None;
        self.published_at = None;
    }

    pub fn revert_to_draft(&mut self, now: DateTime<Utc>) -> DomainResult<()> {
        self.ensure_not_trashed()?;
        match self.status {
            ProductStatus::PendingVerification | ProductStatus::Verified | ProductStatus::Published => {
                self.clear_publication();
                self.set_status(ProductStatus::Draft, now);
                Ok(())
            }
            _ => Err(self.transition_error("revert to draft")),
        }
    }

    /// Published ⇄ archived. Archived products only toggle back if they were
    /// published before being archived.
    pub fn toggle_status(&mut self, now: DateTime<Utc>) -> DomainResult<ProductStatus> {
        self.ensure_not_trashed()?;
        match self.status {
            ProductStatus::Published => self.set_status(ProductStatus::Archived, now),
            ProductStatus::Archived if self.published_at.is_some() && self.verified_by.is_some() => {
                self.set_status(ProductStatus::Published, now)
            }
            ProductStatus::Archived => {
                return Err(DomainError::conflict(
                    "archived product was never published; unarchive it instead",
                ));
            }
            _ => return Err(self.transition_error("toggle the status of")),
        }
        Ok(self.status)
    }

    pub fn soft_delete(&mut self, now: DateTime<Utc>) -> DomainResult<()> {
        self.ensure_not_trashed()?;
        self.deleted_at = Some(now);
        self.updated_at = now;
        Ok(())
    }

    pub fn restore(&mut self, now: DateTime<Utc>) -> DomainResult<()> {
        if !self.is_trashed() {
            return Err(DomainError::conflict("product is not deleted"));
        }
        self.deleted_at = None;
        self.updated_at = now;
        Ok(())
    }
}
