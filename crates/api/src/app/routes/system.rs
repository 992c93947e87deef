use std::sync::Arc;

use axum::{extract::Extension, response::Response};
use chrono::Utc;
use serde_json::json;

use pricelens_auth::permissions::DASHBOARD_VIEW;

use crate::app::{errors, response, services::AppServices};
use crate::authz;
use crate::context::PrincipalContext;

pub async fn health() -> Response {
    response::success(json!({"ok": true}))
}

/// GET /api/dashboard/stats
pub async fn dashboard_stats(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
) -> Response {
    if let Err(resp) = authz::require(&principal, &DASHBOARD_VIEW) {
        return resp;
    }
    match services.dashboard_stats() {
        Ok(stats) => response::success(stats),
        Err(e) => errors::domain_error_to_response(e),
    }
}

/// GET /api/dashboard/health - static descriptor of the product services.
pub async fn dashboard_health(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
) -> Response {
    if let Err(resp) = authz::require(&principal, &DASHBOARD_VIEW) {
        return resp;
    }
    let uptime = (Utc::now() - services.started_at).num_seconds();
    response::success(json!({
        "products": services.products.get_service_health(),
        "uptime_seconds": uptime,
    }))
}
