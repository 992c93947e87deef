//! Affiliate links: one marketplace offer for a product.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use pricelens_core::input::check_length;
use pricelens_core::{
    DomainResult, Entity, FieldErrors, Input, LinkId, MarketplaceId, ProductId, RawInput,
};

use crate::price::{check_price, Price};
use crate::requests::is_http_url;

pub const MAX_RATING: f32 = 5.0;
pub const URL_MAX: usize = 2048;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Link {
    pub id: LinkId,
    pub product_id: ProductId,
    pub marketplace_id: MarketplaceId,
    pub store_name: String,
    pub url: String,
    pub price: u64,
    pub rating: Option<f32>,
    pub sold_count: u64,
    pub active: bool,
    pub clicks: u64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Entity for Link {
    type Id = LinkId;

    fn id(&self) -> LinkId {
        self.id
    }
}

impl Link {
    pub fn create(product_id: ProductId, request: &CreateLinkRequest, now: DateTime<Utc>) -> Self {
        Self {
            id: LinkId::new(),
            product_id,
            marketplace_id: request.marketplace_id,
            store_name: request.store_name.clone(),
            url: request.url.clone(),
            price: request.price.amount(),
            rating: request.rating,
            sold_count: request.sold_count,
            active: request.active,
            clicks: 0,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn apply(&mut self, request: &UpdateLinkRequest, now: DateTime<Utc>) {
        if let Some(marketplace_id) = request.marketplace_id {
            self.marketplace_id = marketplace_id;
        }
        if let Some(store_name) = &request.store_name {
            self.store_name = store_name.clone();
        }
        if let Some(url) = &request.url {
            self.url = url.clone();
        }
        if let Some(price) = request.price {
            self.price = price.amount();
        }
        if let Some(rating) = request.rating {
            self.rating = rating;
        }
        if let Some(sold_count) = request.sold_count {
            self.sold_count = sold_count;
        }
        if let Some(active) = request.active {
            self.active = active;
        }
        self.updated_at = now;
    }
}

/// Cheapest active offer among `links`.
pub fn lowest_price<'a>(links: impl IntoIterator<Item = &'a Link>) -> Option<u64> {
    links
        .into_iter()
        .filter(|l| l.active)
        .map(|l| l.price)
        .min()
}

fn check_url(errors: &mut FieldErrors, url: &str) {
    if url.len() > URL_MAX {
        errors.add("url", format!("url must not exceed {URL_MAX} characters"));
    } else if !is_http_url(url) {
        errors.add("url", "url must be a valid http or https address");
    }
}

fn check_rating(errors: &mut FieldErrors, rating: f64) -> Option<f32> {
    if (0.0..=MAX_RATING as f64).contains(&rating) {
        Some(rating as f32)
    } else {
        errors.add("rating", "rating must be between 0 and 5");
        None
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct CreateLinkRequest {
    pub marketplace_id: MarketplaceId,
    pub store_name: String,
    pub url: String,
    pub price: Price,
    pub rating: Option<f32>,
    pub sold_count: u64,
    pub active: bool,
}

impl CreateLinkRequest {
    pub fn from_request(raw: &RawInput) -> DomainResult<Self> {
        let input = Input::new(raw);
        let mut errors = FieldErrors::new();

        let marketplace_id = input.parse::<MarketplaceId>("marketplace_id", &mut errors);
        if marketplace_id.is_none() && !errors.contains("marketplace_id") {
            errors.add("marketplace_id", "marketplace_id is required");
        }

        let store_name = input.string("store_name");
        match &store_name {
            Some(s) => check_length(&mut errors, "store_name", s, 2, 255),
            None => errors.add("store_name", "store_name is required"),
        }

        let url = input.string("url");
        match &url {
            Some(u) => check_url(&mut errors, u),
            None => errors.add("url", "url is required"),
        }

        let price = match input.u64("price", &mut errors) {
            Some(amount) => check_price(&mut errors, "price", amount),
            None => {
                if !errors.contains("price") {
                    errors.add("price", "price is required");
                }
                None
            }
        };

        let rating = input
            .f64("rating", &mut errors)
            .and_then(|r| check_rating(&mut errors, r));
        let sold_count = input.u64("sold_count", &mut errors).unwrap_or(0);
        let active = input.bool("active", &mut errors).unwrap_or(true);

        errors.into_result()?;

        match (marketplace_id, store_name, url, price) {
            (Some(marketplace_id), Some(store_name), Some(url), Some(price)) => Ok(Self {
                marketplace_id,
                store_name,
                url,
                price,
                rating,
                sold_count,
                active,
            }),
            _ => Err(pricelens_core::DomainError::validation("incomplete link input")),
        }
    }
}

/// Partial link update; `rating: Some(None)` clears the rating.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UpdateLinkRequest {
    pub marketplace_id: Option<MarketplaceId>,
    pub store_name: Option<String>,
    pub url: Option<String>,
    pub price: Option<Price>,
    pub rating: Option<Option<f32>>,
    pub sold_count: Option<u64>,
    pub active: Option<bool>,
}

impl UpdateLinkRequest {
    pub fn from_request(raw: &RawInput) -> DomainResult<Self> {
        let input = Input::new(raw);
        let mut errors = FieldErrors::new();
        let mut request = Self {
            marketplace_id: input.parse::<MarketplaceId>("marketplace_id", &mut errors),
            ..Self::default()
        };

        // Required on create, so a present-but-blank value is an error here too.
        for field in ["marketplace_id", "store_name", "url", "price"] {
            if input.has(field) && input.is_blank(field) {
                errors.add(field, format!("{field} cannot be empty"));
            }
        }

        if let Some(s) = input.string("store_name") {
            check_length(&mut errors, "store_name", &s, 2, 255);
            request.store_name = Some(s);
        }
        if let Some(u) = input.string("url") {
            check_url(&mut errors, &u);
            request.url = Some(u);
        }
        if let Some(amount) = input.u64("price", &mut errors) {
            request.price = check_price(&mut errors, "price", amount);
        }
        if input.has("rating") {
            request.rating = Some(
                input
                    .f64("rating", &mut errors)
                    .and_then(|r| check_rating(&mut errors, r)),
            );
        }
        request.sold_count = input.u64("sold_count", &mut errors);
        request.active = input.bool("active", &mut errors);

        errors.into_result()?;
        Ok(request)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{json, Value};

    fn create(value: Value) -> DomainResult<CreateLinkRequest> {
        CreateLinkRequest::from_request(value.as_object().unwrap())
    }

    fn valid() -> Value {
        json!({
            "marketplace_id": MarketplaceId::new().to_string(),
            "store_name": "Toko Elektronik Jaya",
            "url": "https://shopee.co.id/product/123/456",
            "price": "2500000",
            "rating": 4.8,
            "sold_count": 1200,
        })
    }

    #[test]
    fn create_accepts_valid_offer() {
        let req = create(valid()).unwrap();
        assert_eq!(req.price.amount(), 2_500_000);
        assert_eq!(req.rating, Some(4.8));
        assert!(req.active);
    }

    #[test]
    fn rating_bounds() {
        for (rating, ok) in [(0.0, true), (5.0, true), (5.01, false), (-0.1, false)] {
            let mut v = valid();
            v["rating"] = json!(rating);
            assert_eq!(create(v).is_ok(), ok, "rating {rating}");
        }
    }

    #[test]
    fn url_scheme_must_be_http() {
        for (url, ok) in [
            ("http://tokopedia.com/toko/item", true),
            ("ftp://tokopedia.com/item", false),
            ("javascript:alert(1)", false),
            ("tokopedia.com/item", false),
        ] {
            let mut v = valid();
            v["url"] = json!(url);
            assert_eq!(create(v).is_ok(), ok, "{url}");
        }
    }

    #[test]
    fn missing_fields_are_reported() {
        let err = create(json!({})).unwrap_err();
        let fields = err.field_errors().unwrap();
        for f in ["marketplace_id", "store_name", "url", "price"] {
            assert!(fields.contains(f), "{f}");
        }
    }

    #[test]
    fn lowest_price_ignores_inactive() {
        let product = ProductId::new();
        let mut cheap = Link::create(product, &create(valid()).unwrap(), Utc::now());
        cheap.price = 1_000;
        cheap.active = false;
        let normal = Link::create(product, &create(valid()).unwrap(), Utc::now());

        assert_eq!(lowest_price([&cheap, &normal]), Some(2_500_000));
        assert_eq!(lowest_price(std::iter::empty::<&Link>()), None);
    }

    #[test]
    fn update_clears_rating() {
        let req = UpdateLinkRequest::from_request(json!({"rating": null}).as_object().unwrap()).unwrap();
        assert_eq!(req.rating, Some(None));
    }

    #[test]
    fn update_rejects_blanked_required_fields() {
        let err = UpdateLinkRequest::from_request(
            json!({"store_name": "", "url": " ", "price": "", "marketplace_id": null})
                .as_object()
                .unwrap(),
        )
        .unwrap_err();
        let fields = err.field_errors().unwrap();
        for f in ["store_name", "url", "price", "marketplace_id"] {
            assert!(fields.contains(f), "{f}");
        }

        let req = UpdateLinkRequest::from_request(json!({"sold_count": 10}).as_object().unwrap()).unwrap();
        assert!(req.store_name.is_none() && req.price.is_none());
    }
}
