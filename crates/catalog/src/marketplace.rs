use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use pricelens_core::input::check_length;
use pricelens_core::{DomainResult, Entity, FieldErrors, Input, MarketplaceId, RawInput};

use crate::slug::{is_valid_slug, slugify};

/// An online marketplace that hosts affiliate offers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Marketplace {
    pub id: MarketplaceId,
    pub name: String,
    pub slug: String,
    /// Brand color as `#rrggbb`.
    pub color: Option<String>,
    pub active: bool,
    pub created_at: DateTime<Utc>,
}

impl Entity for Marketplace {
    type Id = MarketplaceId;

    fn id(&self) -> MarketplaceId {
        self.id
    }
}

impl Marketplace {
    pub fn create(request: &CreateMarketplaceRequest, now: DateTime<Utc>) -> Self {
        Self {
            id: MarketplaceId::new(),
            name: request.name.clone(),
            slug: request.slug.clone(),
            color: request.color.clone(),
            active: true,
            created_at: now,
        }
    }
}

/// Marketplaces every fresh installation starts with.
pub fn default_marketplaces() -> Vec<CreateMarketplaceRequest> {
    [
        ("Shopee", "#ee4d2d"),
        ("Tokopedia", "#42b549"),
        ("Lazada", "#0f146d"),
        ("Blibli", "#0095da"),
        ("Bukalapak", "#e31e52"),
        ("TikTok Shop", "#000000"),
    ]
    .into_iter()
    .map(|(name, color)| CreateMarketplaceRequest {
        name: name.to_string(),
        slug: slugify(name),
        color: Some(color.to_string()),
    })
    .collect()
}

fn is_hex_color(value: &str) -> bool {
    value.len() == 7
        && value.starts_with('#')
        && value[1..].chars().all(|c| c.is_ascii_hexdigit())
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateMarketplaceRequest {
    pub name: String,
    pub slug: String,
    pub color: Option<String>,
}

impl CreateMarketplaceRequest {
    pub fn from_request(raw: &RawInput) -> DomainResult<Self> {
        let input = Input::new(raw);
        let mut errors = FieldErrors::new();

        let name = input.string("name");
        match &name {
            Some(n) => check_length(&mut errors, "name", n, 2, 100),
            None => errors.add("name", "name is required"),
        }

        let slug = input
            .string("slug")
            .or_else(|| name.as_deref().map(slugify));
        if let Some(s) = &slug {
            if !is_valid_slug(s) {
                errors.add("slug", "slug may only contain lowercase letters, digits and single dashes");
            }
        }

        let color = input.string("color").map(|c| c.to_lowercase());
        if let Some(c) = &color {
            if !is_hex_color(c) {
                errors.add("color", "color must look like #rrggbb");
            }
        }

        errors.into_result()?;

        Ok(Self {
            name: name.unwrap_or_default(),
            slug: slug.unwrap_or_default(),
            color,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn defaults_are_valid() {
        let defaults = default_marketplaces();
        assert!(defaults.iter().any(|m| m.slug == "tiktok-shop"));
        for m in &defaults {
            assert!(is_valid_slug(&m.slug));
            assert!(m.color.as_deref().is_some_and(is_hex_color));
        }
    }

    #[test]
    fn request_derives_slug_and_checks_color() {
        let raw = json!({"name": "Zalora", "color": "#FF0000"});
        let req = CreateMarketplaceRequest::from_request(raw.as_object().unwrap()).unwrap();
        assert_eq!(req.slug, "zalora");
        assert_eq!(req.color.as_deref(), Some("#ff0000"));

        let raw = json!({"name": "Zalora", "color": "red"});
        let err = CreateMarketplaceRequest::from_request(raw.as_object().unwrap()).unwrap_err();
        assert!(err.field_errors().unwrap().contains("color"));
    }
}
