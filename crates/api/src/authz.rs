//! API-side authorization guard.
//!
//! Routes call [`require`] before touching a service, so domain services stay
//! auth-agnostic.

use axum::response::Response;

use pricelens_auth::{authorize, authorize_all, Permission};

use crate::app::errors;
use crate::context::PrincipalContext;

/// Check a single permission for the current admin.
pub fn require(principal: &PrincipalContext, required: &Permission) -> Result<(), Response> {
    authorize(principal.principal(), required).map_err(|e| {
        tracing::warn!(
            admin_id = %principal.admin_id(),
            permission = %required,
            "permission denied"
        );
        errors::authz_error_to_response(e)
    })
}

/// Check every permission in `required`.
pub fn require_all(principal: &PrincipalContext, required: &[Permission]) -> Result<(), Response> {
    authorize_all(principal.principal(), required).map_err(|e| {
        tracing::warn!(admin_id = %principal.admin_id(), "permission denied");
        errors::authz_error_to_response(e)
    })
}
