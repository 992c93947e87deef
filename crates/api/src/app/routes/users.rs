//! Admin accounts and role permissions.
//!
//! Only a super-admin may hand out the `super_admin` role.

use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, Extension, Path},
    http::StatusCode,
    response::Response,
    routing::{get, post, put},
    Json, Router,
};
use serde_json::{json, Value};

use pricelens_auth::permissions::{ROLES_MANAGE, USERS_MANAGE};
use pricelens_auth::{CreateAdminRequest, RolePermissionsRequest, Role, UpdateAdminRequest};
use pricelens_core::AdminId;

use super::common::parse_id;
use crate::app::{dto, errors, response, services::AppServices};
use crate::authz;
use crate::context::PrincipalContext;

pub fn router() -> Router {
    Router::new()
        .route("/", get(list_admins).post(create_admin))
        .route("/:id", get(get_admin).put(update_admin).patch(update_admin))
        .route("/:id/deactivate", post(deactivate_admin))
}

pub fn roles_router() -> Router {
    Router::new()
        .route("/", get(list_roles))
        .route("/:name/permissions", put(set_role_permissions))
}

fn escalation_guard(principal: &PrincipalContext, role: Option<&Role>) -> Result<(), Response> {
    match role {
        Some(role) if role.is_super_admin() && !principal.role().is_super_admin() => {
            tracing::warn!(admin_id = %principal.admin_id(), "super_admin assignment refused");
            Err(errors::json_error(
                StatusCode::FORBIDDEN,
                "privilege_escalation",
                format!("cannot assign role '{}'", role.as_str()),
            ))
        }
        _ => Ok(()),
    }
}

/// GET /admin/users
pub async fn list_admins(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
) -> Response {
    if let Err(resp) = authz::require(&principal, &USERS_MANAGE) {
        return resp;
    }
    match services.accounts.list_admins() {
        Ok(admins) => response::success(admins.iter().map(dto::admin_to_json).collect::<Vec<_>>()),
        Err(e) => errors::domain_error_to_response(e),
    }
}

/// POST /admin/users
pub async fn create_admin(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
    payload: Result<Json<Value>, JsonRejection>,
) -> Response {
    if let Err(resp) = authz::require(&principal, &USERS_MANAGE) {
        return resp;
    }
    let raw = match dto::body(payload) {
        Ok(raw) => raw,
        Err(resp) => return resp,
    };
    let request = match CreateAdminRequest::from_request(&raw) {
        Ok(r) => r,
        Err(e) => return errors::domain_error_to_response(e),
    };
    if let Err(resp) = escalation_guard(&principal, Some(&request.role)) {
        return resp;
    }

    match services.accounts.create_admin(request) {
        Ok(admin) => {
            let view = dto::admin_to_json(&admin);
            services.record_audit(principal.admin_id(), "admin.create", "admin", admin.id, None, Some(view.clone()));
            response::created("admin created", view)
        }
        Err(e) => errors::auth_error_to_response(e),
    }
}

/// GET /admin/users/:id
pub async fn get_admin(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
    Path(id): Path<String>,
) -> Response {
    if let Err(resp) = authz::require(&principal, &USERS_MANAGE) {
        return resp;
    }
    let id: AdminId = match parse_id(&id) {
        Ok(id) => id,
        Err(resp) => return resp,
    };
    match services.accounts.get_admin(id) {
        Ok(admin) => response::success(dto::admin_to_json(&admin)),
        Err(e) => errors::domain_error_to_response(e),
    }
}

/// PUT /admin/users/:id - an admin cannot demote or deactivate themselves
pub async fn update_admin(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
    Path(id): Path<String>,
    payload: Result<Json<Value>, JsonRejection>,
) -> Response {
    if let Err(resp) = authz::require(&principal, &USERS_MANAGE) {
        return resp;
    }
    let id: AdminId = match parse_id(&id) {
        Ok(id) => id,
        Err(resp) => return resp,
    };
    let raw = match dto::body(payload) {
        Ok(raw) => raw,
        Err(resp) => return resp,
    };
    let request = match UpdateAdminRequest::from_request(&raw) {
        Ok(r) => r,
        Err(e) => return errors::domain_error_to_response(e),
    };
    if let Err(resp) = escalation_guard(&principal, request.role.as_ref()) {
        return resp;
    }
    let before = match services.accounts.get_admin(id) {
        Ok(a) => a,
        Err(e) => return errors::domain_error_to_response(e),
    };

    match services.accounts.update_admin(id, request, principal.admin_id()) {
        Ok(admin) => {
            let view = dto::admin_to_json(&admin);
            services.record_audit(
                principal.admin_id(),
                "admin.update",
                "admin",
                id,
                Some(dto::admin_to_json(&before)),
                Some(view.clone()),
            );
            response::with_message("admin updated", view)
        }
        Err(e) => errors::auth_error_to_response(e),
    }
}

/// POST /admin/users/:id/deactivate
pub async fn deactivate_admin(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
    Path(id): Path<String>,
) -> Response {
    if let Err(resp) = authz::require(&principal, &USERS_MANAGE) {
        return resp;
    }
    let id: AdminId = match parse_id(&id) {
        Ok(id) => id,
        Err(resp) => return resp,
    };
    match services.accounts.deactivate_admin(id, principal.admin_id()) {
        Ok(admin) => {
            services.record_audit(
                principal.admin_id(),
                "admin.deactivate",
                "admin",
                id,
                Some(json!({"active": true})),
                Some(json!({"active": false})),
            );
            response::with_message("admin deactivated", dto::admin_to_json(&admin))
        }
        Err(e) => errors::auth_error_to_response(e),
    }
}

/// GET /admin/roles
pub async fn list_roles(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
) -> Response {
    if let Err(resp) = authz::require(&principal, &ROLES_MANAGE) {
        return resp;
    }
    match services.accounts.roles() {
        Ok(roles) => response::success(roles.iter().map(dto::role_to_json).collect::<Vec<_>>()),
        Err(e) => errors::domain_error_to_response(e),
    }
}

/// PUT /admin/roles/:name/permissions - `{permissions: [..]}`; takes effect on the next request
pub async fn set_role_permissions(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
    Path(name): Path<String>,
    payload: Result<Json<Value>, JsonRejection>,
) -> Response {
    if let Err(resp) = authz::require(&principal, &ROLES_MANAGE) {
        return resp;
    }
    let raw = match dto::body(payload) {
        Ok(raw) => raw,
        Err(resp) => return resp,
    };
    let request = match RolePermissionsRequest::from_request(&raw) {
        Ok(r) => r,
        Err(e) => return errors::domain_error_to_response(e),
    };
    let role = Role::new(name);
    match services.accounts.set_role_permissions(&role, request) {
        Ok(definition) => {
            let view = dto::role_to_json(&definition);
            services.record_audit(
                principal.admin_id(),
                "role.permissions",
                "role",
                role.as_str(),
                None,
                Some(view.clone()),
            );
            response::with_message("role permissions updated", view)
        }
        Err(e) => errors::domain_error_to_response(e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pricelens_auth::roles::{ADMIN, EDITOR, SUPER_ADMIN};
    use pricelens_auth::Principal;

    fn ctx(role: Role) -> PrincipalContext {
        PrincipalContext::new(Principal::new(AdminId::new(), "ops", role))
    }

    #[test]
    fn only_super_admins_grant_super_admin() {
        assert!(escalation_guard(&ctx(ADMIN), Some(&SUPER_ADMIN)).is_err());
        assert!(escalation_guard(&ctx(ADMIN), Some(&EDITOR)).is_ok());
        assert!(escalation_guard(&ctx(ADMIN), None).is_ok());
        assert!(escalation_guard(&ctx(SUPER_ADMIN), Some(&SUPER_ADMIN)).is_ok());
    }
}
