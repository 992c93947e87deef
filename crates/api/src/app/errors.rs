//! The one place where service errors become HTTP responses.

use std::sync::atomic::{AtomicBool, Ordering};

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::{json, Value};

use pricelens_auth::{AuthError, AuthzError, JwtError};
use pricelens_core::DomainError;

const GENERIC_SERVER_ERROR: &str = "an internal error occurred";

static HIDE_INTERNAL_MESSAGES: AtomicBool = AtomicBool::new(false);

/// In production, 500 responses carry a generic message instead of the cause.
pub fn set_production(enabled: bool) {
    HIDE_INTERNAL_MESSAGES.store(enabled, Ordering::Relaxed);
}

fn hide_internal_messages() -> bool {
    HIDE_INTERNAL_MESSAGES.load(Ordering::Relaxed)
}

pub fn json_error(status: StatusCode, code: &'static str, message: impl Into<String>) -> Response {
    error_body(status, code, message.into(), None)
}

fn error_body(status: StatusCode, code: &'static str, message: String, errors: Option<Value>) -> Response {
    let mut body = json!({
        "status": "error",
        "message": message,
        "error": code,
        "data": null,
        "meta": null,
    });
    if let Some(errors) = errors {
        body["errors"] = errors;
    }
    (status, axum::Json(body)).into_response()
}

/// Status code and machine-readable code for a domain error.
pub fn classify(err: &DomainError) -> (StatusCode, &'static str) {
    match err {
        DomainError::Validation(_) | DomainError::InvalidFields(_) => {
            (StatusCode::BAD_REQUEST, "validation_error")
        }
        DomainError::InvalidId(_) => (StatusCode::BAD_REQUEST, "invalid_id"),
        DomainError::NotFound(_) => (StatusCode::NOT_FOUND, "not_found"),
        DomainError::Conflict(_) => (StatusCode::CONFLICT, "conflict"),
        DomainError::InvariantViolation(_) => (StatusCode::CONFLICT, "invariant_violation"),
        DomainError::Unauthorized => (StatusCode::FORBIDDEN, "forbidden"),
        DomainError::Storage(_) => (StatusCode::INTERNAL_SERVER_ERROR, "server_error"),
    }
}

pub fn domain_error_to_response(err: DomainError) -> Response {
    let (status, code) = classify(&err);
    match err {
        DomainError::InvalidFields(fields) => {
            let errors = serde_json::to_value(&fields).unwrap_or(Value::Null);
            error_body(status, code, "the given data was invalid".to_string(), Some(errors))
        }
        DomainError::Storage(msg) => server_error(msg),
        other => error_body(status, code, other.to_string(), None),
    }
}

pub fn auth_error_to_response(err: AuthError) -> Response {
    match err {
        AuthError::InvalidCredentials | AuthError::Inactive => {
            json_error(StatusCode::UNAUTHORIZED, "unauthenticated", err.to_string())
        }
        AuthError::Domain(e) => domain_error_to_response(e),
        AuthError::Password(e) => server_error(e.to_string()),
        AuthError::Jwt(e) => server_error(e.to_string()),
    }
}

pub fn authz_error_to_response(err: AuthzError) -> Response {
    json_error(StatusCode::FORBIDDEN, "forbidden", err.to_string())
}

pub fn token_error_to_response(err: JwtError) -> Response {
    json_error(StatusCode::UNAUTHORIZED, "unauthenticated", err.to_string())
}

/// 500 with the cause logged and, in production, withheld from the client.
pub fn server_error(message: impl Into<String>) -> Response {
    let message = message.into();
    tracing::error!(error = %message, "request failed");
    let shown = if hide_internal_messages() {
        GENERIC_SERVER_ERROR.to_string()
    } else {
        message
    };
    json_error(StatusCode::INTERNAL_SERVER_ERROR, "server_error", shown)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn domain_errors_map_to_expected_statuses() {
        let cases = [
            (DomainError::validation("bad"), StatusCode::BAD_REQUEST),
            (DomainError::field("price", "too low"), StatusCode::BAD_REQUEST),
            (DomainError::invalid_id("x"), StatusCode::BAD_REQUEST),
            (DomainError::not_found("product"), StatusCode::NOT_FOUND),
            (DomainError::conflict("slug"), StatusCode::CONFLICT),
            (DomainError::invariant("status"), StatusCode::CONFLICT),
            (DomainError::Unauthorized, StatusCode::FORBIDDEN),
            (DomainError::storage("disk"), StatusCode::INTERNAL_SERVER_ERROR),
        ];
        for (err, status) in cases {
            assert_eq!(classify(&err).0, status, "{err:?}");
            assert_eq!(domain_error_to_response(err).status(), status);
        }
    }

    #[test]
    fn credential_failures_are_unauthenticated() {
        assert_eq!(
            auth_error_to_response(AuthError::InvalidCredentials).status(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            auth_error_to_response(AuthError::Domain(DomainError::not_found("admin"))).status(),
            StatusCode::NOT_FOUND
        );
    }
}
