use std::collections::HashMap;
use std::str::FromStr;

use axum::response::Response;

use pricelens_core::{DomainError, PageRequest};

use crate::app::errors;

/// Raw query-string parameters.
pub type Params = HashMap<String, String>;

/// Parse a path identifier, answering garbage with 400.
pub fn parse_id<T: FromStr<Err = DomainError>>(raw: &str) -> Result<T, Response> {
    raw.parse::<T>().map_err(errors::domain_error_to_response)
}

pub fn page_request(params: &Params) -> PageRequest {
    PageRequest::from_raw(
        params.get("page").map(String::as_str),
        params.get("per_page").map(String::as_str),
    )
}

/// `true` for `1`, `true`, `yes` and `on`.
pub fn flag(params: &Params, key: &str) -> bool {
    params
        .get(key)
        .map(|v| matches!(v.trim().to_ascii_lowercase().as_str(), "1" | "true" | "yes" | "on"))
        .unwrap_or(false)
}

/// `limit` clamped to `1..=max`, `default` when absent or unparsable.
pub fn limit(params: &Params, default: u32, max: u32) -> u32 {
    params
        .get("limit")
        .and_then(|v| v.trim().parse::<u32>().ok())
        .unwrap_or(default)
        .clamp(1, max)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pricelens_core::ProductId;

    fn params(pairs: &[(&str, &str)]) -> Params {
        pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect()
    }

    #[test]
    fn bad_ids_are_bad_requests() {
        let response = parse_id::<ProductId>("nope").unwrap_err();
        assert_eq!(response.status(), axum::http::StatusCode::BAD_REQUEST);
    }

    #[test]
    fn limits_and_flags() {
        let p = params(&[("limit", "500"), ("active", "Yes")]);
        assert_eq!(limit(&p, 10, 50), 50);
        assert!(flag(&p, "active"));
        assert!(!flag(&p, "trashed"));
        assert_eq!(limit(&params(&[]), 10, 50), 10);
    }
}
