//! HTML fragments for HTMX requests.
//!
//! Fragment handlers never propagate errors: every outcome is a small HTML
//! body plus an `HX-Trigger` header whose JSON value names client events
//! (a toast, and optionally a list refresh).

use axum::http::{HeaderName, HeaderValue, StatusCode};
use axum::response::{Html, IntoResponse, Response};
use serde_json::{json, Map, Value};

use pricelens_catalog::{Category, Product};
use pricelens_core::DomainError;

use crate::app::errors;

pub const HX_TRIGGER: HeaderName = HeaderName::from_static("hx-trigger");

/// Client event asking the product table to reload.
pub const REFRESH_PRODUCTS: &str = "refreshProducts";

/// Events carried by one `HX-Trigger` header.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Trigger {
    events: Map<String, Value>,
}

impl Trigger {
    pub fn toast(level: &str, message: impl Into<String>) -> Self {
        let mut events = Map::new();
        events.insert(
            "showToast".to_string(),
            json!({"type": level, "message": message.into()}),
        );
        Self { events }
    }

    pub fn and(mut self, event: &str) -> Self {
        self.events.insert(event.to_string(), Value::Bool(true));
        self
    }

    pub fn header_value(&self) -> HeaderValue {
        let rendered = Value::Object(self.events.clone()).to_string();
        HeaderValue::from_str(&rendered).unwrap_or_else(|_| HeaderValue::from_static("{}"))
    }
}

pub fn fragment(status: StatusCode, html: String, trigger: Option<Trigger>) -> Response {
    let mut response = (status, Html(html)).into_response();
    if let Some(trigger) = trigger {
        response.headers_mut().insert(HX_TRIGGER, trigger.header_value());
    }
    response
}

/// Error fragment with the status the JSON API would have used.
pub fn error_fragment(err: &DomainError) -> Response {
    let (status, _) = errors::classify(err);
    let message = match err {
        DomainError::Storage(_) => "Something went wrong, please try again".to_string(),
        other => other.to_string(),
    };
    if status.is_server_error() {
        tracing::error!(error = %err, "htmx request failed");
    }
    fragment(
        status,
        format!(r#"<div class="alert alert-error">{}</div>"#, escape(&message)),
        Some(Trigger::toast("error", message)),
    )
}

/// Fragment for a rejected permission check.
pub fn forbidden_fragment() -> Response {
    let message = "You do not have permission to do that";
    fragment(
        StatusCode::FORBIDDEN,
        format!(r#"<div class="alert alert-error">{message}</div>"#),
        Some(Trigger::toast("error", message)),
    )
}

pub fn escape(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for ch in input.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(ch),
        }
    }
    out
}

pub fn search_results(term: &str, products: &[Product]) -> String {
    if products.is_empty() {
        return format!(
            r#"<div class="search-empty">No products found for "{}"</div>"#,
            escape(term)
        );
    }
    let mut html = String::from(r#"<ul class="search-results">"#);
    for p in products {
        let price = pricelens_catalog::Price::new(p.price)
            .map(|price| price.format_idr())
            .unwrap_or_default();
        html.push_str(&format!(
            r#"<li><a href="/products/{slug}">{name}</a> <span class="price">{price}</span></li>"#,
            slug = escape(&p.slug),
            name = escape(&p.name),
            price = escape(&price),
        ));
    }
    html.push_str("</ul>");
    html
}

pub fn category_children(children: &[Category]) -> String {
    let mut html = String::from(r#"<ul class="category-children">"#);
    for c in children {
        html.push_str(&format!(
            r#"<li><a href="/categories/{slug}" hx-get="/htmx/categories/{id}/children" hx-target="next ul">{name}</a><ul></ul></li>"#,
            slug = escape(&c.slug),
            id = c.id,
            name = escape(&c.name),
        ));
    }
    html.push_str("</ul>");
    html
}

pub fn status_badge(product: &Product) -> String {
    format!(
        r#"<span class="badge badge-{status}" id="status-{id}">{label}</span>"#,
        status = product.status.as_str(),
        id = product.id,
        label = product.status.label(),
    )
}

/// One row of the admin product table.
pub fn product_row(product: &Product) -> String {
    let price = pricelens_catalog::Price::new(product.price)
        .map(|price| price.format_idr())
        .unwrap_or_default();
    format!(
        r#"<tr id="product-{id}"><td>{name}</td><td>{price}</td><td>{badge}</td></tr>"#,
        id = product.id,
        name = escape(&product.name),
        price = escape(&price),
        badge = status_badge(product),
    )
}

/// Summary list under the bulk toolbar; failed ids carry their reason.
pub fn bulk_summary(result: &pricelens_catalog::BulkActionResult) -> String {
    let mut html = format!(
        r#"<div class="bulk-result bulk-{level}"><p>{message}</p>"#,
        level = result.level(),
        message = escape(&result.message()),
    );
    if result.has_failures() {
        html.push_str("<ul>");
        for failure in &result.failed {
            html.push_str(&format!(
                "<li>{id}: {reason}</li>",
                id = failure.id,
                reason = escape(&failure.reason),
            ));
        }
        html.push_str("</ul>");
    }
    html.push_str("</div>");
    html
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn escapes_markup() {
        assert_eq!(escape(r#"<b a="x">&'"#), "&lt;b a=&quot;x&quot;&gt;&amp;&#39;");
    }

    #[test]
    fn trigger_header_is_json() {
        let trigger = Trigger::toast("warning", "2 products published; 1 failed").and(REFRESH_PRODUCTS);
        let value: Value = serde_json::from_str(trigger.header_value().to_str().unwrap()).unwrap();
        assert_eq!(value["showToast"]["type"], "warning");
        assert_eq!(value[REFRESH_PRODUCTS], true);
    }

    #[test]
    fn error_fragment_keeps_status_and_toast() {
        let response = error_fragment(&DomainError::conflict("cannot publish an archived product"));
        assert_eq!(response.status(), StatusCode::CONFLICT);
        assert!(response.headers().contains_key(HX_TRIGGER));
    }

    #[test]
    fn empty_search_echoes_escaped_term() {
        let html = search_results("<script>", &[]);
        assert!(html.contains("&lt;script&gt;"));
    }
}
