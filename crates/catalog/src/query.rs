//! Product listing queries.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use pricelens_core::{CategoryId, DomainResult, FieldErrors, Page, PageRequest};

use crate::product::{Product, ProductStatus};

/// How soft-deleted products take part in a query.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TrashedFilter {
    #[default]
    Without,
    With,
    Only,
}

impl TrashedFilter {
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "without" | "0" | "false" => Some(Self::Without),
            "with" | "1" | "true" => Some(Self::With),
            "only" => Some(Self::Only),
            _ => None,
        }
    }

    pub fn admits(&self, trashed: bool) -> bool {
        match self {
            Self::Without => !trashed,
            Self::With => true,
            Self::Only => trashed,
        }
    }
}

#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProductSort {
    #[default]
    Newest,
    Oldest,
    PriceAsc,
    PriceDesc,
    NameAsc,
    Popular,
}

impl ProductSort {
    pub const ALL: [ProductSort; 6] = [
        Self::Newest,
        Self::Oldest,
        Self::PriceAsc,
        Self::PriceDesc,
        Self::NameAsc,
        Self::Popular,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Newest => "newest",
            Self::Oldest => "oldest",
            Self::PriceAsc => "price_asc",
            Self::PriceDesc => "price_desc",
            Self::NameAsc => "name_asc",
            Self::Popular => "popular",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        let needle = s.trim().to_ascii_lowercase();
        Self::ALL.into_iter().find(|sort| sort.as_str() == needle)
    }

    fn compare(&self, a: &Product, b: &Product) -> std::cmp::Ordering {
        let primary = match self {
            Self::Newest => b.created_at.cmp(&a.created_at),
            Self::Oldest => a.created_at.cmp(&b.created_at),
            Self::PriceAsc => a.price.cmp(&b.price),
            Self::PriceDesc => b.price.cmp(&a.price),
            Self::NameAsc => a.name.to_lowercase().cmp(&b.name.to_lowercase()),
            Self::Popular => b.view_count.cmp(&a.view_count),
        };
        // Ids are time-ordered, which keeps ties stable.
        primary.then_with(|| a.id.cmp(&b.id))
    }
}

/// Constraints layered on top of a query with [`ProductQuery::with`].
/// Every `Some` field replaces the query's value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryOverrides {
    pub status: Option<ProductStatus>,
    pub trashed: Option<TrashedFilter>,
    pub category_id: Option<CategoryId>,
    pub sort: Option<ProductSort>,
    pub page: Option<PageRequest>,
}

impl QueryOverrides {
    /// Storefront safety constraints: published and not trashed.
    pub fn public() -> Self {
        Self {
            status: Some(ProductStatus::Published),
            trashed: Some(TrashedFilter::Without),
            ..Self::default()
        }
    }

    pub fn status(status: ProductStatus) -> Self {
        Self {
            status: Some(status),
            ..Self::default()
        }
    }
}

/// Filter, sort and pagination for product listings.
///
/// A query is never mutated once built; `with` produces a new one.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ProductQuery {
    search: Option<String>,
    category_id: Option<CategoryId>,
    status: Option<ProductStatus>,
    trashed: TrashedFilter,
    min_price: Option<u64>,
    max_price: Option<u64>,
    sort: ProductSort,
    page: PageRequest,
}

impl ProductQuery {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from query-string parameters.
    ///
    /// Blank values are ignored; `status=all` means no status filter.
    pub fn from_params(params: &HashMap<String, String>) -> DomainResult<Self> {
        let get = |key: &str| param(params, key);
        let mut errors = FieldErrors::new();

        let search = get("search").or_else(|| get("q")).map(str::to_string);

        let category_id = match get("category_id") {
            Some(raw) => match raw.parse::<CategoryId>() {
                Ok(id) => Some(id),
                Err(_) => {
                    errors.add("category_id", "category_id is not valid");
                    None
                }
            },
            None => None,
        };

        let status = match get("status") {
            Some(raw) if raw.eq_ignore_ascii_case("all") => None,
            Some(raw) => {
                let parsed = ProductStatus::parse(raw);
                if parsed.is_none() {
                    errors.add("status", format!("unknown status `{raw}`"));
                }
                parsed
            }
            None => None,
        };

        let trashed = match get("trashed") {
            Some(raw) => TrashedFilter::parse(raw).unwrap_or_else(|| {
                errors.add("trashed", "trashed must be one of without, with, only");
                TrashedFilter::Without
            }),
            None => TrashedFilter::Without,
        };

        let mut price = |field: &str| match get(field) {
            Some(raw) => match raw.parse::<u64>() {
                Ok(v) => Some(v),
                Err(_) => {
                    errors.add(field, format!("{field} must be a whole number of rupiah"));
                    None
                }
            },
            None => None,
        };
        let min_price = price("min_price");
        let max_price = price("max_price");
        if let (Some(min), Some(max)) = (min_price, max_price) {
            if min > max {
                errors.add("max_price", "max_price must not be below min_price");
            }
        }

        let sort = match get("sort") {
            Some(raw) => ProductSort::parse(raw).unwrap_or_else(|| {
                errors.add("sort", format!("unknown sort `{raw}`"));
                ProductSort::default()
            }),
            None => ProductSort::default(),
        };

        let page = PageRequest::from_raw(get("page"), get("per_page"));

        errors.into_result()?;

        Ok(Self {
            search,
            category_id,
            status,
            trashed,
            min_price,
            max_price,
            sort,
            page,
        })
    }

    /// New query with `overrides` applied; `self` is left untouched.
    pub fn with(&self, overrides: QueryOverrides) -> Self {
        let mut next = self.clone();
        if let Some(status) = overrides.status {
            next.status = Some(status);
        }
        if let Some(trashed) = overrides.trashed {
            next.trashed = trashed;
        }
        if let Some(category_id) = overrides.category_id {
            next.category_id = Some(category_id);
        }
        if let Some(sort) = overrides.sort {
            next.sort = sort;
        }
        if let Some(page) = overrides.page {
            next.page = page;
        }
        next
    }

    pub fn with_search(&self, term: impl Into<String>) -> Self {
        let term = term.into();
        let mut next = self.clone();
        next.search = (!term.trim().is_empty()).then(|| term.trim().to_string());
        next
    }

    pub fn with_price_range(&self, min_price: Option<u64>, max_price: Option<u64>) -> Self {
        let mut next = self.clone();
        next.min_price = min_price;
        next.max_price = max_price;
        next
    }

    pub fn search(&self) -> Option<&str> {
        self.search.as_deref()
    }

    pub fn category_id(&self) -> Option<CategoryId> {
        self.category_id
    }

    pub fn status(&self) -> Option<ProductStatus> {
        self.status
    }

    pub fn trashed(&self) -> TrashedFilter {
        self.trashed
    }

    pub fn min_price(&self) -> Option<u64> {
        self.min_price
    }

    pub fn max_price(&self) -> Option<u64> {
        self.max_price
    }

    pub fn sort(&self) -> ProductSort {
        self.sort
    }

    pub fn page(&self) -> PageRequest {
        self.page
    }

    /// Whether the query constrains listings to what the storefront may show.
    pub fn is_public_safe(&self) -> bool {
        self.status == Some(ProductStatus::Published) && self.trashed == TrashedFilter::Without
    }

    pub fn matches(&self, product: &Product) -> bool {
        if !self.trashed.admits(product.is_trashed()) {
            return false;
        }
        if self.status.is_some_and(|s| s != product.status) {
            return false;
        }
        if self.category_id.is_some() && self.category_id != product.category_id {
            return false;
        }
        if self.min_price.is_some_and(|min| product.price < min) {
            return false;
        }
        if self.max_price.is_some_and(|max| product.price > max) {
            return false;
        }
        match &self.search {
            Some(term) => matches_term(product, term),
            None => true,
        }
    }

    /// Filter, sort and paginate an unordered product set.
    pub fn apply(&self, products: impl IntoIterator<Item = Product>) -> Page<Product> {
        let mut matched: Vec<Product> = products.into_iter().filter(|p| self.matches(p)).collect();
        matched.sort_by(|a, b| self.sort.compare(a, b));
        self.page.paginate(matched)
    }
}

fn param<'a>(params: &'a HashMap<String, String>, key: &str) -> Option<&'a str> {
    params
        .get(key)
        .map(|v| v.trim())
        .filter(|v| !v.is_empty())
}

/// Case-insensitive match on name, slug or description.
pub fn matches_term(product: &Product, term: &str) -> bool {
    let term = term.trim().to_lowercase();
    if term.is_empty() {
        return true;
    }
    product.name.to_lowercase().contains(&term)
        || product.slug.contains(&term)
        || product
            .description
            .as_deref()
            .is_some_and(|d| d.to_lowercase().contains(&term))
}
