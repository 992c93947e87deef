//! Product request DTOs.
//!
//! Each DTO is built from raw associative input, validates inline and fails
//! with `DomainError::InvalidFields` carrying every offending field.

use std::collections::BTreeSet;

use pricelens_core::input::check_length;
use pricelens_core::{CategoryId, DomainResult, FieldErrors, Input, RawInput};

use crate::price::{check_price, Price};
use crate::slug::is_valid_slug;

pub const NAME_MIN: usize = 3;
pub const NAME_MAX: usize = 255;
pub const DESCRIPTION_MAX: usize = 5000;
pub const IMAGE_MAX: usize = 255;

/// `true` for absolute http(s) URLs with a host.
pub fn is_http_url(value: &str) -> bool {
    match url::Url::parse(value) {
        Ok(url) => {
            matches!(url.scheme(), "http" | "https")
                && url.host_str().is_some_and(|h| !h.is_empty())
        }
        Err(_) => false,
    }
}

fn validate_name(errors: &mut FieldErrors, name: &str) {
    check_length(errors, "name", name, NAME_MIN, NAME_MAX);
}

fn validate_slug(errors: &mut FieldErrors, slug: &str) {
    if !is_valid_slug(slug) {
        errors.add(
            "slug",
            "slug may only contain lowercase letters, digits and single dashes",
        );
    }
}

fn validate_description(errors: &mut FieldErrors, description: &str) {
    if description.chars().count() > DESCRIPTION_MAX {
        errors.add(
            "description",
            format!("description must not exceed {DESCRIPTION_MAX} characters"),
        );
    }
}

/// Image is either an absolute http(s) URL or a relative storage path.
fn validate_image(errors: &mut FieldErrors, image: &str) {
    if image.len() > IMAGE_MAX {
        errors.add("image", format!("image must not exceed {IMAGE_MAX} characters"));
    } else if image.contains("://") {
        if !is_http_url(image) {
            errors.add("image", "image URL must use http or https");
        }
    } else if image.contains("..") || image.starts_with('/') {
        errors.add("image", "image path must be relative to the upload directory");
    }
}

/// Input contract for `create_product`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateProductRequest {
    pub name: String,
    /// Explicit slug; derived from `name` when absent.
    pub slug: Option<String>,
    pub description: Option<String>,
    pub price: Price,
    pub category_id: Option<CategoryId>,
    pub image: Option<String>,
}

impl CreateProductRequest {
    pub fn from_request(raw: &RawInput) -> DomainResult<Self> {
        let input = Input::new(raw);
        let mut errors = FieldErrors::new();

        let name = input.string("name");
        match &name {
            Some(n) => validate_name(&mut errors, n),
            None => errors.add("name", "name is required"),
        }

        let slug = input.string("slug");
        if let Some(s) = &slug {
            validate_slug(&mut errors, s);
        }

        let description = input.string("description");
        if let Some(d) = &description {
            validate_description(&mut errors, d);
        }

        let price = match input.u64("price", &mut errors) {
            Some(amount) => check_price(&mut errors, "price", amount),
            None => {
                if !input.has("price") || input.is_blank("price") {
                    errors.add("price", "price is required");
                }
                None
            }
        };

        let category_id = input.parse::<CategoryId>("category_id", &mut errors);

        let image = input.string("image");
        if let Some(i) = &image {
            validate_image(&mut errors, i);
        }

        errors.into_result()?;

        match (name, price) {
            (Some(name), Some(price)) => Ok(Self {
                name,
                slug,
                description,
                price,
                category_id,
                image,
            }),
            _ => Err(pricelens_core::DomainError::validation("incomplete product input")),
        }
    }
}

/// Column-level change set. `None` means "leave unchanged"; for nullable
/// columns `Some(None)` clears the value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProductPatch {
    pub name: Option<String>,
    pub slug: Option<String>,
    pub description: Option<Option<String>>,
    pub price: Option<Price>,
    pub category_id: Option<Option<CategoryId>>,
    pub image: Option<Option<String>>,
}

impl ProductPatch {
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.slug.is_none()
            && self.description.is_none()
            && self.price.is_none()
            && self.category_id.is_none()
            && self.image.is_none()
    }
}

/// Input contract for `update_product` (partial update).
///
/// Tracks which fields the caller supplied so that only those columns are
/// written.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UpdateProductRequest {
    patch: ProductPatch,
    present: BTreeSet<&'static str>,
}

impl UpdateProductRequest {
    pub const FIELDS: [&'static str; 6] =
        ["name", "slug", "description", "price", "category_id", "image"];

    pub fn from_request(raw: &RawInput) -> DomainResult<Self> {
        let input = Input::new(raw);
        let mut errors = FieldErrors::new();
        let mut patch = ProductPatch::default();
        let mut present = BTreeSet::new();

        for field in Self::FIELDS {
            if input.has(field) {
                present.insert(field);
            }
        }

        if present.contains("name") {
            match input.string("name") {
                Some(n) => {
                    validate_name(&mut errors, &n);
                    patch.name = Some(n);
                }
                None => errors.add("name", "name cannot be empty"),
            }
        }

        if present.contains("slug") {
            match input.string("slug") {
                Some(s) => {
                    validate_slug(&mut errors, &s);
                    patch.slug = Some(s);
                }
                None => errors.add("slug", "slug cannot be empty"),
            }
        }

        if present.contains("description") {
            let description = input.string("description");
            if let Some(d) = &description {
                validate_description(&mut errors, d);
            }
            patch.description = Some(description);
        }

        if present.contains("price") {
            match input.u64("price", &mut errors) {
                Some(amount) => patch.price = check_price(&mut errors, "price", amount),
                None if input.is_blank("price") => errors.add("price", "price cannot be empty"),
                None => {}
            }
        }

        if present.contains("category_id") {
            patch.category_id = Some(input.parse::<CategoryId>("category_id", &mut errors));
        }

        if present.contains("image") {
            let image = input.string("image");
            if let Some(i) = &image {
                validate_image(&mut errors, i);
            }
            patch.image = Some(image);
        }

        errors.into_result()?;
        Ok(Self { patch, present })
    }

    /// Whether the caller supplied `field`.
    pub fn has(&self, field: &str) -> bool {
        self.present.contains(field)
    }

    /// Supplied fields, in a stable order.
    pub fn changed_fields(&self) -> Vec<&'static str> {
        self.present.iter().copied().collect()
    }

    pub fn is_empty(&self) -> bool {
        self.present.is_empty()
    }

    pub fn patch(&self) -> &ProductPatch {
        &self.patch
    }

    pub fn name(&self) -> Option<&str> {
        self.patch.name.as_deref()
    }

    pub fn price(&self) -> Option<Price> {
        self.patch.price
    }

    pub fn category_id(&self) -> Option<Option<CategoryId>> {
        self.patch.category_id
    }
}

/// Inline edit from the admin product table: name, price and category only.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QuickEditProductRequest {
    patch: ProductPatch,
}

impl QuickEditProductRequest {
    pub fn from_request(raw: &RawInput) -> DomainResult<Self> {
        let input = Input::new(raw);
        let mut errors = FieldErrors::new();
        let mut patch = ProductPatch::default();

        if let Some(name) = input.string("name") {
            validate_name(&mut errors, &name);
            patch.name = Some(name);
        }

        if let Some(amount) = input.u64("price", &mut errors) {
            patch.price = check_price(&mut errors, "price", amount);
        }

        if input.has("category_id") {
            patch.category_id = Some(input.parse::<CategoryId>("category_id", &mut errors));
        }

        errors.into_result()?;

        if patch.is_empty() {
            return Err(pricelens_core::DomainError::validation(
                "quick edit needs at least one of name, price or category_id",
            ));
        }
        Ok(Self { patch })
    }

    pub fn patch(&self) -> &ProductPatch {
        &self.patch
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pricelens_core::DomainError;
    use serde_json::{json, Value};

    fn raw(value: Value) -> RawInput {
        value.as_object().cloned().unwrap()
    }

    fn create(value: Value) -> DomainResult<CreateProductRequest> {
        CreateProductRequest::from_request(&raw(value))
    }

    #[test]
    fn create_accepts_form_style_price() {
        let req = create(json!({"name": "Kopi Kapal Api", "price": "15000"})).unwrap();
        assert_eq!(req.price.amount(), 15_000);
        assert!(req.slug.is_none());
    }

    #[test]
    fn create_price_boundaries() {
        assert!(create(json!({"name": "Permen", "price": 99})).is_err());
        assert!(create(json!({"name": "Permen", "price": 100})).is_ok());
        assert!(create(json!({"name": "Rumah", "price": 1_000_000_000u64})).is_ok());

        let err = create(json!({"name": "Rumah", "price": 1_000_000_001u64})).unwrap_err();
        assert!(err.field_errors().unwrap().contains("price"));
    }

    #[test]
    fn create_requires_name_and_price() {
        let err = create(json!({"description": "no name"})).unwrap_err();
        let fields = err.field_errors().unwrap();
        assert_eq!(fields.get("name"), Some("name is required"));
        assert_eq!(fields.get("price"), Some("price is required"));
    }

    #[test]
    fn create_rejects_bad_slug_category_and_image() {
        let err = create(json!({
            "name": "Laptop",
            "price": 5_000_000,
            "slug": "Not A Slug",
            "category_id": "xyz",
            "image": "ftp://files.example.com/a.png",
        }))
        .unwrap_err();
        let fields = err.field_errors().unwrap();
        assert!(fields.contains("slug"));
        assert!(fields.contains("category_id"));
        assert!(fields.contains("image"));
    }

    #[test]
    fn image_paths_must_stay_relative() {
        assert!(create(json!({"name": "Kamera", "price": 100, "image": "products/kamera.webp"})).is_ok());
        assert!(create(json!({"name": "Kamera", "price": 100, "image": "../etc/passwd"})).is_err());
        assert!(create(json!({"name": "Kamera", "price": 100, "image": "https://cdn.example.com/k.webp"})).is_ok());
    }

    #[test]
    fn update_tracks_present_fields_only() {
        let req = UpdateProductRequest::from_request(&raw(json!({
            "price": 250000,
            "description": null,
        })))
        .unwrap();

        assert!(req.has("price"));
        assert!(req.has("description"));
        assert!(!req.has("name"));
        assert_eq!(req.changed_fields(), vec!["description", "price"]);
        assert_eq!(req.patch().description, Some(None));
        assert!(req.patch().name.is_none());
    }

    #[test]
    fn update_rejects_blanking_required_fields() {
        let err = UpdateProductRequest::from_request(&raw(json!({"name": "", "price": ""}))).unwrap_err();
        let fields = err.field_errors().unwrap();
        assert!(fields.contains("name"));
        assert!(fields.contains("price"));
    }

    #[test]
    fn update_can_clear_category() {
        let req = UpdateProductRequest::from_request(&raw(json!({"category_id": ""}))).unwrap();
        assert_eq!(req.category_id(), Some(None));
    }

    #[test]
    fn quick_edit_needs_something() {
        let err = QuickEditProductRequest::from_request(&raw(json!({}))).unwrap_err();
        assert!(matches!(err, DomainError::Validation(_)));

        let req = QuickEditProductRequest::from_request(&raw(json!({"price": "120000"}))).unwrap();
        assert_eq!(req.patch().price.map(|p| p.amount()), Some(120_000));
    }

    #[test]
    fn url_check() {
        assert!(is_http_url("https://shopee.co.id/product/1/2"));
        assert!(is_http_url("http://tokopedia.com"));
        assert!(!is_http_url("javascript:alert(1)"));
        assert!(!is_http_url("mailto:a@b.c"));
        assert!(!is_http_url("not a url"));
    }
}
