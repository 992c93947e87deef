use std::sync::Arc;

use axum::{
    extract::{Extension, Query},
    response::Response,
    routing::get,
    Router,
};

use pricelens_auth::permissions::AUDIT_VIEW;
use pricelens_infra::AuditFilter;

use super::common::{page_request, Params};
use crate::app::{dto, errors, response, services::AppServices};
use crate::authz;
use crate::context::PrincipalContext;

pub fn router() -> Router {
    Router::new().route("/", get(list_audit_logs))
}

/// GET /admin/audit-logs?admin_id=&entity_type=&action=&page=&per_page= - newest first
pub async fn list_audit_logs(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
    Query(params): Query<Params>,
) -> Response {
    if let Err(resp) = authz::require(&principal, &AUDIT_VIEW) {
        return resp;
    }
    let filter = AuditFilter::from_params(&params);
    match services.audit.list(&filter, page_request(&params)) {
        Ok(page) => response::paginated(page.map(|log| dto::audit_log_to_json(&log))),
        Err(e) => errors::domain_error_to_response(e),
    }
}
