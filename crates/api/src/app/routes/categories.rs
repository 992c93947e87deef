use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, Extension, Path, Query},
    response::Response,
    routing::get,
    Json, Router,
};
use serde_json::Value;

use pricelens_auth::permissions::{CATEGORIES_MANAGE, PRODUCTS_VIEW};
use pricelens_catalog::{CreateCategoryRequest, UpdateCategoryRequest};
use pricelens_core::CategoryId;

use super::common::{flag, parse_id, Params};
use crate::app::{dto, errors, response, services::AppServices};
use crate::authz;
use crate::context::PrincipalContext;

pub fn router() -> Router {
    Router::new()
        .route("/", get(list_categories).post(create_category))
        .route(
            "/:id",
            get(get_category)
                .put(update_category)
                .patch(update_category)
                .delete(delete_category),
        )
}

/// GET /admin/categories - tree by default, `flat=1` for a sorted list
pub async fn list_categories(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
    Query(params): Query<Params>,
) -> Response {
    if let Err(resp) = authz::require(&principal, &PRODUCTS_VIEW) {
        return resp;
    }
    let active_only = flag(&params, "active");
    if flag(&params, "flat") {
        return match services.categories.list(active_only) {
            Ok(all) => response::success(all.iter().map(dto::category_to_json).collect::<Vec<_>>()),
            Err(e) => errors::domain_error_to_response(e),
        };
    }
    match services.categories.tree(active_only) {
        Ok(tree) => response::success(tree.iter().map(dto::category_node_to_json).collect::<Vec<_>>()),
        Err(e) => errors::domain_error_to_response(e),
    }
}

pub async fn get_category(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
    Path(id): Path<String>,
) -> Response {
    if let Err(resp) = authz::require(&principal, &PRODUCTS_VIEW) {
        return resp;
    }
    let id: CategoryId = match parse_id(&id) {
        Ok(id) => id,
        Err(resp) => return resp,
    };
    match services.categories.get(id) {
        Ok(category) => response::success(dto::category_to_json(&category)),
        Err(e) => errors::domain_error_to_response(e),
    }
}

pub async fn create_category(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
    payload: Result<Json<Value>, JsonRejection>,
) -> Response {
    if let Err(resp) = authz::require(&principal, &CATEGORIES_MANAGE) {
        return resp;
    }
    let raw = match dto::body(payload) {
        Ok(raw) => raw,
        Err(resp) => return resp,
    };
    let request = match CreateCategoryRequest::from_request(&raw) {
        Ok(r) => r,
        Err(e) => return errors::domain_error_to_response(e),
    };
    match services.categories.create(request) {
        Ok(category) => {
            let view = dto::category_to_json(&category);
            services.record_audit(
                principal.admin_id(),
                "category.create",
                "category",
                category.id,
                None,
                Some(view.clone()),
            );
            response::created("category created", view)
        }
        Err(e) => errors::domain_error_to_response(e),
    }
}

/// Re-parenting under a descendant is a conflict.
pub async fn update_category(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
    Path(id): Path<String>,
    payload: Result<Json<Value>, JsonRejection>,
) -> Response {
    if let Err(resp) = authz::require(&principal, &CATEGORIES_MANAGE) {
        return resp;
    }
    let id: CategoryId = match parse_id(&id) {
        Ok(id) => id,
        Err(resp) => return resp,
    };
    let raw = match dto::body(payload) {
        Ok(raw) => raw,
        Err(resp) => return resp,
    };
    let request = match UpdateCategoryRequest::from_request(&raw) {
        Ok(r) => r,
        Err(e) => return errors::domain_error_to_response(e),
    };
    let before = match services.categories.get(id) {
        Ok(c) => c,
        Err(e) => return errors::domain_error_to_response(e),
    };
    match services.categories.update(id, request) {
        Ok(category) => {
            let view = dto::category_to_json(&category);
            services.record_audit(
                principal.admin_id(),
                "category.update",
                "category",
                id,
                Some(dto::category_to_json(&before)),
                Some(view.clone()),
            );
            response::with_message("category updated", view)
        }
        Err(e) => errors::domain_error_to_response(e),
    }
}

/// Refused while the category still has children or live products.
pub async fn delete_category(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
    Path(id): Path<String>,
) -> Response {
    if let Err(resp) = authz::require(&principal, &CATEGORIES_MANAGE) {
        return resp;
    }
    let id: CategoryId = match parse_id(&id) {
        Ok(id) => id,
        Err(resp) => return resp,
    };
    match services.categories.delete(id) {
        Ok(category) => {
            services.record_audit(
                principal.admin_id(),
                "category.delete",
                "category",
                id,
                Some(dto::category_to_json(&category)),
                None,
            );
            response::with_message("category deleted", Value::Null)
        }
        Err(e) => errors::domain_error_to_response(e),
    }
}
