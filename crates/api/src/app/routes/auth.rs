//! Sign-in and the current admin.

use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, Extension},
    http::StatusCode,
    response::Response,
    Json,
};
use chrono::Utc;
use serde_json::{json, Value};

use pricelens_core::Input;

use crate::app::{dto, errors, response, services::AppServices};
use crate::context::PrincipalContext;

/// POST /api/auth/login - `{login|username|email, password}`
pub async fn login(
    Extension(services): Extension<Arc<AppServices>>,
    payload: Result<Json<Value>, JsonRejection>,
) -> Response {
    let raw = match dto::body(payload) {
        Ok(raw) => raw,
        Err(resp) => return resp,
    };
    let input = Input::new(&raw);
    let login = input
        .string("login")
        .or_else(|| input.string("username"))
        .or_else(|| input.string("email"));
    let password = raw.get("password").and_then(Value::as_str);

    let (Some(login), Some(password)) = (login, password) else {
        return errors::json_error(
            StatusCode::BAD_REQUEST,
            "validation_error",
            "login and password are required",
        );
    };

    match services.accounts.login(&login, password, Utc::now()) {
        Ok(outcome) => {
            services.record_audit(outcome.admin.id, "auth.login", "admin", outcome.admin.id, None, None);
            response::with_message(
                "signed in",
                json!({
                    "token": outcome.token,
                    "token_type": "Bearer",
                    "expires_at": outcome.expires_at.to_rfc3339(),
                    "admin": dto::admin_to_json(&outcome.admin),
                }),
            )
        }
        Err(e) => {
            tracing::warn!(login = %login, error = %e, "sign-in rejected");
            errors::auth_error_to_response(e)
        }
    }
}

/// POST /api/auth/logout - tokens are stateless; the client drops its copy.
pub async fn logout(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
) -> Response {
    services.record_audit(principal.admin_id(), "auth.logout", "admin", principal.admin_id(), None, None);
    response::with_message("signed out", Value::Null)
}

/// GET /api/auth/me
pub async fn me(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
) -> Response {
    match services.accounts.get_admin(principal.admin_id()) {
        Ok(admin) => {
            let mut body = dto::admin_to_json(&admin);
            body["permissions"] = json!(principal
                .permissions()
                .iter()
                .map(|p| p.as_str())
                .collect::<Vec<_>>());
            response::success(body)
        }
        Err(e) => errors::domain_error_to_response(e),
    }
}
