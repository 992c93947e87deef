//! Back-office product management: CRUD, workflow transitions, bulk actions
//! and a product's marketplace links.

use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, Extension, Path, Query},
    response::Response,
    routing::{get, post, put},
    Json, Router,
};
use serde_json::{json, Value};

use pricelens_auth::permissions::{
    LINKS_MANAGE, PRODUCTS_BULK, PRODUCTS_CREATE, PRODUCTS_DELETE, PRODUCTS_PUBLISH,
    PRODUCTS_UPDATE, PRODUCTS_VERIFY, PRODUCTS_VIEW,
};
use pricelens_auth::Permission;
use pricelens_catalog::{
    BulkAction, BulkActionRequest, CreateLinkRequest, CreateProductRequest, Product, ProductQuery,
    QuickEditProductRequest, UpdateLinkRequest, UpdateProductRequest,
};
use pricelens_core::{DomainResult, LinkId, ProductId};
use pricelens_products::ProductOrchestratorInterface;

use super::common::{limit, parse_id, Params};
use crate::app::{dto, errors, response, services::AppServices};
use crate::authz;
use crate::context::PrincipalContext;

pub fn router() -> Router {
    Router::new()
        .route("/", get(list_products).post(create_product))
        .route("/search", get(search_products))
        .route("/status-counts", get(status_counts))
        .route("/bulk", post(bulk_action))
        .route("/links/:link_id", put(update_link).patch(update_link).delete(delete_link))
        .route(
            "/:id",
            get(get_product)
                .put(update_product)
                .patch(update_product)
                .delete(delete_product),
        )
        .route("/:id/restore", post(restore_product))
        .route("/:id/quick-edit", post(quick_edit_product).patch(quick_edit_product))
        .route("/:id/publish", post(publish_product))
        .route("/:id/verify", post(verify_product))
        .route("/:id/request-verification", post(request_verification))
        .route("/:id/archive", post(archive_product))
        .route("/:id/unarchive", post(unarchive_product))
        .route("/:id/toggle-status", post(toggle_status))
        .route("/:id/revert-to-draft", post(revert_to_draft))
        .route("/:id/links", get(list_links).post(create_link))
}

/// Permission an admin needs, on top of `products.bulk`, to run `action`.
pub fn bulk_permission(action: BulkAction) -> Permission {
    match action {
        BulkAction::Publish | BulkAction::Archive | BulkAction::Unarchive => PRODUCTS_PUBLISH,
        BulkAction::Verify => PRODUCTS_VERIFY,
        BulkAction::RevertToDraft => PRODUCTS_UPDATE,
        BulkAction::Delete | BulkAction::Restore => PRODUCTS_DELETE,
    }
}

fn status_snapshot(p: &Product) -> Value {
    json!({"status": p.status.as_str(), "deleted_at": p.deleted_at.map(|d| d.to_rfc3339())})
}

// -------------------------
// CRUD
// -------------------------

/// GET /admin/products - every status; `trashed=with|only` reaches the trash
pub async fn list_products(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
    Query(params): Query<Params>,
) -> Response {
    if let Err(resp) = authz::require(&principal, &PRODUCTS_VIEW) {
        return resp;
    }
    let query = match ProductQuery::from_params(&params) {
        Ok(q) => q,
        Err(e) => return errors::domain_error_to_response(e),
    };
    match services.products.list_products(&query, true) {
        Ok(page) => response::paginated(page.map(|p| dto::to_admin_json(&p))),
        Err(e) => errors::domain_error_to_response(e),
    }
}

/// GET /admin/products/search?q=&limit=
pub async fn search_products(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
    Query(params): Query<Params>,
) -> Response {
    if let Err(resp) = authz::require(&principal, &PRODUCTS_VIEW) {
        return resp;
    }
    let term = params.get("q").map(String::as_str).unwrap_or_default();
    match services.products.search_products(term, limit(&params, 10, 50)) {
        Ok(found) => response::success(found.iter().map(dto::to_admin_json).collect::<Vec<_>>()),
        Err(e) => errors::domain_error_to_response(e),
    }
}

/// GET /admin/products/status-counts
pub async fn status_counts(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
) -> Response {
    if let Err(resp) = authz::require(&principal, &PRODUCTS_VIEW) {
        return resp;
    }
    match services.products.count_products_by_status() {
        Ok(counts) => response::success(
            counts
                .iter()
                .map(|(status, n)| (status.as_str().to_string(), json!(n)))
                .collect::<serde_json::Map<_, _>>(),
        ),
        Err(e) => errors::domain_error_to_response(e),
    }
}

pub async fn create_product(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
    payload: Result<Json<Value>, JsonRejection>,
) -> Response {
    if let Err(resp) = authz::require(&principal, &PRODUCTS_CREATE) {
        return resp;
    }
    let raw = match dto::body(payload) {
        Ok(raw) => raw,
        Err(resp) => return resp,
    };
    let request = match CreateProductRequest::from_request(&raw) {
        Ok(r) => r,
        Err(e) => return errors::domain_error_to_response(e),
    };

    match services.products.create_product(request) {
        Ok(product) => {
            let view = dto::to_admin_json(&product);
            services.record_audit(
                principal.admin_id(),
                "product.create",
                "product",
                product.id,
                None,
                Some(view.clone()),
            );
            response::created("product created", view)
        }
        Err(e) => errors::domain_error_to_response(e),
    }
}

pub async fn get_product(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
    Path(id): Path<String>,
) -> Response {
    if let Err(resp) = authz::require(&principal, &PRODUCTS_VIEW) {
        return resp;
    }
    let id: ProductId = match parse_id(&id) {
        Ok(id) => id,
        Err(resp) => return resp,
    };
    let product = match services.products.get_product(id) {
        Ok(p) => p,
        Err(e) => return errors::domain_error_to_response(e),
    };
    match services.product_detail(&product) {
        Ok((category, links, lowest)) => {
            let mut view = dto::to_detail_json(&product, category.as_ref(), &links, lowest);
            // Admins see workflow state on top of the storefront shape.
            if let (Value::Object(detail), Value::Object(admin)) = (&mut view, dto::to_admin_json(&product)) {
                for (key, value) in admin {
                    detail.entry(key).or_insert(value);
                }
            }
            response::success(view)
        }
        Err(e) => errors::domain_error_to_response(e),
    }
}

pub async fn update_product(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
    Path(id): Path<String>,
    payload: Result<Json<Value>, JsonRejection>,
) -> Response {
    if let Err(resp) = authz::require(&principal, &PRODUCTS_UPDATE) {
        return resp;
    }
    let id: ProductId = match parse_id(&id) {
        Ok(id) => id,
        Err(resp) => return resp,
    };
    let raw = match dto::body(payload) {
        Ok(raw) => raw,
        Err(resp) => return resp,
    };
    let request = match UpdateProductRequest::from_request(&raw) {
        Ok(r) => r,
        Err(e) => return errors::domain_error_to_response(e),
    };
    let before = match services.products.get_product(id) {
        Ok(p) => p,
        Err(e) => return errors::domain_error_to_response(e),
    };

    match services.products.update_product(id, request) {
        Ok(product) => {
            let view = dto::to_admin_json(&product);
            services.record_audit(
                principal.admin_id(),
                "product.update",
                "product",
                id,
                Some(dto::to_admin_json(&before)),
                Some(view.clone()),
            );
            response::with_message("product updated", view)
        }
        Err(e) => errors::domain_error_to_response(e),
    }
}

/// DELETE /admin/products/:id - moves the product to the trash
pub async fn delete_product(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
    Path(id): Path<String>,
) -> Response {
    if let Err(resp) = authz::require(&principal, &PRODUCTS_DELETE) {
        return resp;
    }
    let id: ProductId = match parse_id(&id) {
        Ok(id) => id,
        Err(resp) => return resp,
    };
    match services.products.delete_product(id) {
        Ok(product) => {
            services.record_audit(
                principal.admin_id(),
                "product.delete",
                "product",
                id,
                None,
                Some(status_snapshot(&product)),
            );
            response::with_message("product moved to trash", dto::to_admin_json(&product))
        }
        Err(e) => errors::domain_error_to_response(e),
    }
}

pub async fn restore_product(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
    Path(id): Path<String>,
) -> Response {
    if let Err(resp) = authz::require(&principal, &PRODUCTS_DELETE) {
        return resp;
    }
    let id: ProductId = match parse_id(&id) {
        Ok(id) => id,
        Err(resp) => return resp,
    };
    match services.products.restore_product(id) {
        Ok(product) => {
            services.record_audit(
                principal.admin_id(),
                "product.restore",
                "product",
                id,
                None,
                Some(status_snapshot(&product)),
            );
            response::with_message("product restored", dto::to_admin_json(&product))
        }
        Err(e) => errors::domain_error_to_response(e),
    }
}

/// POST /admin/products/:id/quick-edit - name, price and category only
pub async fn quick_edit_product(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
    Path(id): Path<String>,
    payload: Result<Json<Value>, JsonRejection>,
) -> Response {
    if let Err(resp) = authz::require(&principal, &PRODUCTS_UPDATE) {
        return resp;
    }
    let id: ProductId = match parse_id(&id) {
        Ok(id) => id,
        Err(resp) => return resp,
    };
    let raw = match dto::body(payload) {
        Ok(raw) => raw,
        Err(resp) => return resp,
    };
    let request = match QuickEditProductRequest::from_request(&raw) {
        Ok(r) => r,
        Err(e) => return errors::domain_error_to_response(e),
    };
    match services.products.quick_edit_product(id, request) {
        Ok(product) => {
            let view = dto::to_admin_json(&product);
            services.record_audit(
                principal.admin_id(),
                "product.quick_edit",
                "product",
                id,
                None,
                Some(Value::Object(raw)),
            );
            response::with_message("product updated", view)
        }
        Err(e) => errors::domain_error_to_response(e),
    }
}

// -------------------------
// Workflow
// -------------------------

/// Shared body of every single-product status transition.
fn transition(
    services: &AppServices,
    principal: &PrincipalContext,
    raw_id: &str,
    required: &Permission,
    action: &'static str,
    message: &'static str,
    apply: impl FnOnce(&dyn ProductOrchestratorInterface, ProductId) -> DomainResult<Product>,
) -> Response {
    if let Err(resp) = authz::require(principal, required) {
        return resp;
    }
    let id: ProductId = match parse_id(raw_id) {
        Ok(id) => id,
        Err(resp) => return resp,
    };
    let before = match services.products.get_product(id) {
        Ok(p) => p,
        Err(e) => return errors::domain_error_to_response(e),
    };

    match apply(services.products.as_ref(), id) {
        Ok(product) => {
            services.record_audit(
                principal.admin_id(),
                action,
                "product",
                id,
                Some(status_snapshot(&before)),
                Some(status_snapshot(&product)),
            );
            response::with_message(message, dto::to_admin_json(&product))
        }
        Err(e) => {
            tracing::debug!(product_id = %id, action, error = %e, "transition rejected");
            errors::domain_error_to_response(e)
        }
    }
}

pub async fn publish_product(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
    Path(id): Path<String>,
) -> Response {
    transition(&services, &principal, &id, &PRODUCTS_PUBLISH, "product.publish", "product published", |p, id| {
        p.publish_product(id)
    })
}

pub async fn verify_product(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
    Path(id): Path<String>,
) -> Response {
    let verifier = principal.admin_id();
    transition(&services, &principal, &id, &PRODUCTS_VERIFY, "product.verify", "product verified", |p, id| {
        p.verify_product(id, verifier)
    })
}

pub async fn request_verification(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
    Path(id): Path<String>,
) -> Response {
    transition(
        &services,
        &principal,
        &id,
        &PRODUCTS_UPDATE,
        "product.request_verification",
        "verification requested",
        |p, id| p.request_verification(id),
    )
}

pub async fn archive_product(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
    Path(id): Path<String>,
) -> Response {
    transition(&services, &principal, &id, &PRODUCTS_PUBLISH, "product.archive", "product archived", |p, id| {
        p.archive_product(id)
    })
}

pub async fn unarchive_product(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
    Path(id): Path<String>,
) -> Response {
    transition(&services, &principal, &id, &PRODUCTS_PUBLISH, "product.unarchive", "product unarchived", |p, id| {
        p.unarchive_product(id)
    })
}

pub async fn toggle_status(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
    Path(id): Path<String>,
) -> Response {
    transition(
        &services,
        &principal,
        &id,
        &PRODUCTS_PUBLISH,
        "product.toggle_status",
        "product status changed",
        |p, id| p.toggle_product_status(id),
    )
}

pub async fn revert_to_draft(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
    Path(id): Path<String>,
) -> Response {
    transition(
        &services,
        &principal,
        &id,
        &PRODUCTS_UPDATE,
        "product.revert_to_draft",
        "product reverted to draft",
        |p, id| p.revert_to_draft(id),
    )
}

// -------------------------
// Bulk
// -------------------------

/// POST /admin/products/bulk - `{action, ids: [..]}`; partial failure is a 200
pub async fn bulk_action(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
    payload: Result<Json<Value>, JsonRejection>,
) -> Response {
    if let Err(resp) = authz::require(&principal, &PRODUCTS_BULK) {
        return resp;
    }
    let raw = match dto::body(payload) {
        Ok(raw) => raw,
        Err(resp) => return resp,
    };
    let request = match BulkActionRequest::from_request(&raw) {
        Ok(r) => r,
        Err(e) => return errors::domain_error_to_response(e),
    };
    if let Err(resp) = authz::require(&principal, &bulk_permission(request.action)) {
        return resp;
    }

    let action = request.action;
    match services.products.bulk_action(request, principal.admin_id()) {
        Ok(result) => {
            let view = dto::bulk_result_to_json(&result);
            services.record_audit(
                principal.admin_id(),
                &format!("product.bulk_{}", action.as_str()),
                "product",
                "bulk",
                None,
                Some(view.clone()),
            );
            response::with_message(result.message(), view)
        }
        Err(e) => errors::domain_error_to_response(e),
    }
}

// -------------------------
// Links
// -------------------------

/// GET /admin/products/:id/links - every link, inactive ones included
pub async fn list_links(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
    Path(id): Path<String>,
) -> Response {
    if let Err(resp) = authz::require(&principal, &PRODUCTS_VIEW) {
        return resp;
    }
    let id: ProductId = match parse_id(&id) {
        Ok(id) => id,
        Err(resp) => return resp,
    };
    match services.links.for_product(id, false) {
        Ok(links) => response::success(
            links
                .iter()
                .map(|l| dto::link_to_json(l, services.marketplace(l.marketplace_id).as_ref()))
                .collect::<Vec<_>>(),
        ),
        Err(e) => errors::domain_error_to_response(e),
    }
}

pub async fn create_link(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
    Path(id): Path<String>,
    payload: Result<Json<Value>, JsonRejection>,
) -> Response {
    if let Err(resp) = authz::require(&principal, &LINKS_MANAGE) {
        return resp;
    }
    let product_id: ProductId = match parse_id(&id) {
        Ok(id) => id,
        Err(resp) => return resp,
    };
    let raw = match dto::body(payload) {
        Ok(raw) => raw,
        Err(resp) => return resp,
    };
    let request = match CreateLinkRequest::from_request(&raw) {
        Ok(r) => r,
        Err(e) => return errors::domain_error_to_response(e),
    };
    match services.links.create(product_id, request) {
        Ok(link) => {
            let view = dto::link_to_json(&link, services.marketplace(link.marketplace_id).as_ref());
            services.record_audit(principal.admin_id(), "link.create", "link", link.id, None, Some(view.clone()));
            response::created("link created", view)
        }
        Err(e) => errors::domain_error_to_response(e),
    }
}

pub async fn update_link(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
    Path(link_id): Path<String>,
    payload: Result<Json<Value>, JsonRejection>,
) -> Response {
    if let Err(resp) = authz::require(&principal, &LINKS_MANAGE) {
        return resp;
    }
    let id: LinkId = match parse_id(&link_id) {
        Ok(id) => id,
        Err(resp) => return resp,
    };
    let raw = match dto::body(payload) {
        Ok(raw) => raw,
        Err(resp) => return resp,
    };
    let request = match UpdateLinkRequest::from_request(&raw) {
        Ok(r) => r,
        Err(e) => return errors::domain_error_to_response(e),
    };
    match services.links.update(id, request) {
        Ok(link) => {
            let view = dto::link_to_json(&link, services.marketplace(link.marketplace_id).as_ref());
            services.record_audit(
                principal.admin_id(),
                "link.update",
                "link",
                id,
                None,
                Some(Value::Object(raw)),
            );
            response::with_message("link updated", view)
        }
        Err(e) => errors::domain_error_to_response(e),
    }
}

pub async fn delete_link(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
    Path(link_id): Path<String>,
) -> Response {
    if let Err(resp) = authz::require(&principal, &LINKS_MANAGE) {
        return resp;
    }
    let id: LinkId = match parse_id(&link_id) {
        Ok(id) => id,
        Err(resp) => return resp,
    };
    match services.links.delete(id) {
        Ok(link) => {
            let old = dto::link_to_json(&link, None);
            services.record_audit(principal.admin_id(), "link.delete", "link", id, Some(old), None);
            response::with_message("link deleted", Value::Null)
        }
        Err(e) => errors::domain_error_to_response(e),
    }
}
