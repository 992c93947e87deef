//! HTMX endpoints. Each answers with an HTML fragment and, for admin actions,
//! an `HX-Trigger` header; failures become error fragments, never JSON.

use std::sync::Arc;

use axum::{
    extract::{rejection::FormRejection, Extension, Path, Query},
    http::StatusCode,
    response::Response,
    routing::{get, post},
    Form, Router,
};

use pricelens_auth::permissions::{PRODUCTS_BULK, PRODUCTS_PUBLISH, PRODUCTS_UPDATE};
use pricelens_catalog::{BulkActionRequest, QuickEditProductRequest};
use pricelens_core::{CategoryId, DomainError, ProductId, RawInput};

use super::common::{limit, Params};
use super::products::bulk_permission;
use crate::app::htmx::{self as fragments, Trigger, REFRESH_PRODUCTS};
use crate::app::{dto, services::AppServices};
use crate::authz;
use crate::context::PrincipalContext;

type FormPairs = Result<Form<Vec<(String, String)>>, FormRejection>;

pub fn public_router() -> Router {
    Router::new()
        .route("/products/search", get(search))
        .route("/categories/:id/children", get(category_children))
}

pub fn admin_router() -> Router {
    Router::new()
        .route("/products/bulk", post(bulk_action))
        .route("/products/:id/toggle-status", post(toggle_status))
        .route("/products/:id/quick-edit", post(quick_edit))
}

fn fragment_id<T: std::str::FromStr<Err = DomainError>>(raw: &str) -> Result<T, Response> {
    raw.parse::<T>().map_err(|e| fragments::error_fragment(&e))
}

fn form_input(form: FormPairs) -> Result<RawInput, Response> {
    match form {
        Ok(Form(pairs)) => Ok(dto::form_to_raw(pairs)),
        Err(rejection) => Err(fragments::error_fragment(&DomainError::validation(rejection.body_text()))),
    }
}

/// GET /htmx/products/search?q= - live search over published products
pub async fn search(
    Extension(services): Extension<Arc<AppServices>>,
    Query(params): Query<Params>,
) -> Response {
    let term = params.get("q").map(|q| q.trim()).unwrap_or_default();
    if term.is_empty() {
        return fragments::fragment(StatusCode::OK, String::new(), None);
    }
    match services.products.search_products(term, limit(&params, 8, 20)) {
        Ok(found) => fragments::fragment(StatusCode::OK, fragments::search_results(term, &found), None),
        Err(e) => fragments::error_fragment(&e),
    }
}

/// GET /htmx/categories/:id/children - one level of the category menu
pub async fn category_children(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
) -> Response {
    let id: CategoryId = match fragment_id(&id) {
        Ok(id) => id,
        Err(resp) => return resp,
    };
    match services.categories.children(id, true) {
        Ok(children) => fragments::fragment(StatusCode::OK, fragments::category_children(&children), None),
        Err(e) => fragments::error_fragment(&e),
    }
}

/// POST /htmx/admin/products/:id/toggle-status - swaps the status badge
pub async fn toggle_status(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
    Path(id): Path<String>,
) -> Response {
    if authz::require(&principal, &PRODUCTS_PUBLISH).is_err() {
        return fragments::forbidden_fragment();
    }
    let id: ProductId = match fragment_id(&id) {
        Ok(id) => id,
        Err(resp) => return resp,
    };
    let before = match services.products.get_product(id) {
        Ok(p) => p.status,
        Err(e) => return fragments::error_fragment(&e),
    };

    match services.products.toggle_product_status(id) {
        Ok(product) => {
            services.record_audit(
                principal.admin_id(),
                "product.toggle_status",
                "product",
                id,
                Some(serde_json::json!({"status": before.as_str()})),
                Some(serde_json::json!({"status": product.status.as_str()})),
            );
            let message = format!("{} is now {}", product.name, product.status.label());
            fragments::fragment(
                StatusCode::OK,
                fragments::status_badge(&product),
                Some(Trigger::toast("success", message).and(REFRESH_PRODUCTS)),
            )
        }
        Err(e) => fragments::error_fragment(&e),
    }
}

/// POST /htmx/admin/products/:id/quick-edit - inline table edit
pub async fn quick_edit(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
    Path(id): Path<String>,
    form: FormPairs,
) -> Response {
    if authz::require(&principal, &PRODUCTS_UPDATE).is_err() {
        return fragments::forbidden_fragment();
    }
    let id: ProductId = match fragment_id(&id) {
        Ok(id) => id,
        Err(resp) => return resp,
    };
    let raw = match form_input(form) {
        Ok(raw) => raw,
        Err(resp) => return resp,
    };
    let request = match QuickEditProductRequest::from_request(&raw) {
        Ok(r) => r,
        Err(e) => return fragments::error_fragment(&e),
    };

    match services.products.quick_edit_product(id, request) {
        Ok(product) => {
            services.record_audit(
                principal.admin_id(),
                "product.quick_edit",
                "product",
                id,
                None,
                Some(serde_json::Value::Object(raw)),
            );
            fragments::fragment(
                StatusCode::OK,
                fragments::product_row(&product),
                Some(Trigger::toast("success", "Product updated")),
            )
        }
        Err(e) => fragments::error_fragment(&e),
    }
}

/// POST /htmx/admin/products/bulk - form `action=..&ids[]=..`
///
/// The toast level follows the outcome: success, warning on partial failure,
/// error when nothing was applied.
pub async fn bulk_action(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
    form: FormPairs,
) -> Response {
    if authz::require(&principal, &PRODUCTS_BULK).is_err() {
        return fragments::forbidden_fragment();
    }
    let raw = match form_input(form) {
        Ok(raw) => raw,
        Err(resp) => return resp,
    };
    let request = match BulkActionRequest::from_request(&raw) {
        Ok(r) => r,
        Err(e) => return fragments::error_fragment(&e),
    };
    if authz::require(&principal, &bulk_permission(request.action)).is_err() {
        return fragments::forbidden_fragment();
    }

    let action = request.action;
    match services.products.bulk_action(request, principal.admin_id()) {
        Ok(result) => {
            services.record_audit(
                principal.admin_id(),
                &format!("product.bulk_{}", action.as_str()),
                "product",
                "bulk",
                None,
                Some(dto::bulk_result_to_json(&result)),
            );
            fragments::fragment(
                StatusCode::OK,
                fragments::bulk_summary(&result),
                Some(Trigger::toast(result.level(), result.message()).and(REFRESH_PRODUCTS)),
            )
        }
        Err(e) => fragments::error_fragment(&e),
    }
}
