use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, Extension, Query},
    response::Response,
    routing::get,
    Json, Router,
};
use serde_json::Value;

use pricelens_auth::permissions::{MARKETPLACES_MANAGE, PRODUCTS_VIEW};
use pricelens_catalog::CreateMarketplaceRequest;

use super::common::{flag, Params};
use crate::app::{dto, errors, response, services::AppServices};
use crate::authz;
use crate::context::PrincipalContext;

pub fn router() -> Router {
    Router::new().route("/", get(list_marketplaces).post(create_marketplace))
}

pub async fn list_marketplaces(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
    Query(params): Query<Params>,
) -> Response {
    if let Err(resp) = authz::require(&principal, &PRODUCTS_VIEW) {
        return resp;
    }
    match services.marketplaces.list(flag(&params, "active")) {
        Ok(all) => response::success(all.iter().map(dto::marketplace_to_json).collect::<Vec<_>>()),
        Err(e) => errors::domain_error_to_response(e),
    }
}

pub async fn create_marketplace(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
    payload: Result<Json<Value>, JsonRejection>,
) -> Response {
    if let Err(resp) = authz::require(&principal, &MARKETPLACES_MANAGE) {
        return resp;
    }
    let raw = match dto::body(payload) {
        Ok(raw) => raw,
        Err(resp) => return resp,
    };
    let request = match CreateMarketplaceRequest::from_request(&raw) {
        Ok(r) => r,
        Err(e) => return errors::domain_error_to_response(e),
    };
    match services.marketplaces.create(request) {
        Ok(marketplace) => {
            let view = dto::marketplace_to_json(&marketplace);
            services.record_audit(
                principal.admin_id(),
                "marketplace.create",
                "marketplace",
                marketplace.id,
                None,
                Some(view.clone()),
            );
            response::created("marketplace created", view)
        }
        Err(e) => errors::domain_error_to_response(e),
    }
}
