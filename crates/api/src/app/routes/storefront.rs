//! Public catalog: published products, active categories and offer clicks.
//!
//! Every product listing here is forced through [`QueryOverrides::public`],
//! whatever the caller put in the query string.

use std::sync::Arc;

use axum::{
    extract::{Extension, Path, Query},
    response::Response,
    routing::{get, post},
    Router,
};
use serde_json::json;

use pricelens_catalog::{ProductQuery, QueryOverrides};
use pricelens_core::{CategoryId, DomainError, LinkId};

use super::common::{parse_id, Params};
use crate::app::{dto, errors, response, services::AppServices};

pub fn router() -> Router {
    Router::new()
        .route("/categories", get(list_categories))
        .route("/categories/:slug", get(category_products))
        .route("/products", get(list_products))
        .route("/products/:slug", get(product_detail))
        .route("/links/:id/click", post(click_link))
}

/// GET /api/categories - active category tree
async fn list_categories(Extension(services): Extension<Arc<AppServices>>) -> Response {
    match services.categories.tree(true) {
        Ok(tree) => response::success(tree.iter().map(dto::category_node_to_json).collect::<Vec<_>>()),
        Err(e) => errors::domain_error_to_response(e),
    }
}

/// GET /api/categories/:slug - category plus its published products
async fn category_products(
    Extension(services): Extension<Arc<AppServices>>,
    Path(slug): Path<String>,
    Query(params): Query<Params>,
) -> Response {
    let category = match services.categories.get_by_slug(&slug) {
        Ok(c) if c.active => c,
        Ok(_) => return errors::domain_error_to_response(DomainError::not_found("category")),
        Err(e) => return errors::domain_error_to_response(e),
    };

    let query = match public_query(&params, Some(category.id)) {
        Ok(q) => q,
        Err(resp) => return resp,
    };

    match services.products.list_products(&query, false) {
        Ok(page) => {
            let page = page.map(|p| dto::to_public_json(&p));
            let children = match services.categories.children(category.id, true) {
                Ok(children) => children,
                Err(e) => return errors::domain_error_to_response(e),
            };
            response::success(json!({
                "category": dto::category_to_json(&category),
                "children": children.iter().map(dto::category_to_json).collect::<Vec<_>>(),
                "products": page.items,
                "meta": page.meta,
            }))
        }
        Err(e) => errors::domain_error_to_response(e),
    }
}

/// GET /api/products - published listing with search, filters and sort
async fn list_products(
    Extension(services): Extension<Arc<AppServices>>,
    Query(params): Query<Params>,
) -> Response {
    let query = match public_query(&params, None) {
        Ok(q) => q,
        Err(resp) => return resp,
    };
    match services.products.list_products(&query, false) {
        Ok(page) => response::paginated(page.map(|p| dto::to_public_json(&p))),
        Err(e) => errors::domain_error_to_response(e),
    }
}

/// GET /api/products/:slug - product page; counts a view
async fn product_detail(
    Extension(services): Extension<Arc<AppServices>>,
    Path(slug): Path<String>,
) -> Response {
    // Look first so that drafts never gain views.
    match services.products.get_product_by_slug(&slug, false) {
        Ok(p) if p.is_public() => {}
        Ok(_) => return errors::domain_error_to_response(DomainError::not_found("product")),
        Err(e) => return errors::domain_error_to_response(e),
    }
    let product = match services.products.get_product_by_slug(&slug, true) {
        Ok(p) => p,
        Err(e) => return errors::domain_error_to_response(e),
    };

    match services.product_detail(&product) {
        Ok((category, links, lowest)) => response::success(dto::to_detail_json(
            &product,
            category.as_ref(),
            &links,
            lowest,
        )),
        Err(e) => errors::domain_error_to_response(e),
    }
}

/// POST /api/links/:id/click - count an outbound click and hand back the target
async fn click_link(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
) -> Response {
    let id: LinkId = match parse_id(&id) {
        Ok(id) => id,
        Err(resp) => return resp,
    };
    match services.links.record_click(id) {
        Ok(link) => response::success(json!({
            "url": link.url,
            "clicks": link.clicks,
        })),
        Err(e) => errors::domain_error_to_response(e),
    }
}

fn public_query(params: &Params, category: Option<CategoryId>) -> Result<ProductQuery, Response> {
    let query = ProductQuery::from_params(params).map_err(errors::domain_error_to_response)?;
    let overrides = QueryOverrides {
        category_id: category,
        ..QueryOverrides::public()
    };
    Ok(query.with(overrides))
}
