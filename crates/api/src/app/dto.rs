//! Request body extraction and response views.

use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::Json;
use serde_json::{json, Map, Value};

use pricelens_auth::{Admin, RoleDefinition};
use pricelens_catalog::{
    BulkActionResult, Category, CategoryNode, Link, Marketplace, Price, Product,
};
use pricelens_core::RawInput;
use pricelens_infra::AuditLog;

use crate::app::errors;

// -------------------------
// Request bodies
// -------------------------

/// Unwrap a JSON object body, answering malformed bodies with the error envelope.
pub fn body(payload: Result<Json<Value>, JsonRejection>) -> Result<RawInput, axum::response::Response> {
    match payload {
        Ok(Json(Value::Object(map))) => Ok(map),
        Ok(Json(_)) => Err(errors::json_error(
            StatusCode::BAD_REQUEST,
            "validation_error",
            "request body must be a JSON object",
        )),
        Err(rejection) => Err(errors::json_error(
            StatusCode::BAD_REQUEST,
            "invalid_body",
            rejection.body_text(),
        )),
    }
}

/// Turn url-encoded form pairs into raw input. `ids[]`-style keys lose their
/// brackets and repeated keys become arrays.
pub fn form_to_raw(pairs: Vec<(String, String)>) -> RawInput {
    let mut raw = Map::new();
    for (key, value) in pairs {
        let (key, is_list) = match key.strip_suffix("[]") {
            Some(stripped) => (stripped.to_string(), true),
            None => (key, false),
        };
        match raw.get_mut(&key) {
            Some(Value::Array(items)) => items.push(Value::String(value)),
            Some(existing) => {
                let first = existing.take();
                *existing = Value::Array(vec![first, Value::String(value)]);
            }
            None if is_list => {
                raw.insert(key, Value::Array(vec![Value::String(value)]));
            }
            None => {
                raw.insert(key, Value::String(value));
            }
        }
    }
    raw
}

// -------------------------
// Products
// -------------------------

fn formatted_price(amount: u64) -> Option<String> {
    Price::new(amount).map(|p| p.format_idr())
}

/// Back-office view with workflow and trash state.
pub fn to_admin_json(p: &Product) -> Value {
    json!({
        "id": p.id.to_string(),
        "slug": p.slug,
        "name": p.name,
        "description": p.description,
        "price": p.price,
        "price_formatted": formatted_price(p.price),
        "category_id": p.category_id.map(|c| c.to_string()),
        "image": p.image,
        "status": p.status.as_str(),
        "status_label": p.status.label(),
        "view_count": p.view_count,
        "verified_by": p.verified_by.map(|a| a.to_string()),
        "verified_at": p.verified_at.map(|d| d.to_rfc3339()),
        "published_at": p.published_at.map(|d| d.to_rfc3339()),
        "created_at": p.created_at.to_rfc3339(),
        "updated_at": p.updated_at.to_rfc3339(),
        "deleted_at": p.deleted_at.map(|d| d.to_rfc3339()),
        "is_trashed": p.is_trashed(),
    })
}

/// Storefront view. Workflow internals and trash state are never exposed.
pub fn to_public_json(p: &Product) -> Value {
    json!({
        "id": p.id.to_string(),
        "slug": p.slug,
        "name": p.name,
        "description": p.description,
        "price": p.price,
        "price_formatted": formatted_price(p.price),
        "category_id": p.category_id.map(|c| c.to_string()),
        "image": p.image,
        "view_count": p.view_count,
        "published_at": p.published_at.map(|d| d.to_rfc3339()),
    })
}

/// Product page: public view plus category, active offers and the best price.
pub fn to_detail_json(
    p: &Product,
    category: Option<&Category>,
    links: &[(Link, Option<Marketplace>)],
    lowest_price: Option<u64>,
) -> Value {
    let mut detail = to_public_json(p);
    detail["category"] = category.map(category_summary_json).unwrap_or(Value::Null);
    detail["links"] = Value::Array(
        links
            .iter()
            .map(|(link, marketplace)| link_to_json(link, marketplace.as_ref()))
            .collect(),
    );
    detail["lowest_price"] = json!(lowest_price);
    detail["lowest_price_formatted"] = json!(lowest_price.and_then(formatted_price));
    detail
}

pub fn bulk_result_to_json(result: &BulkActionResult) -> Value {
    json!({
        "action": result.action.as_str(),
        "requested": result.requested,
        "success_count": result.success_count(),
        "failure_count": result.failure_count(),
        "succeeded": result.succeeded.iter().map(|id| id.to_string()).collect::<Vec<_>>(),
        "failed": result.failed.iter().map(|f| json!({
            "id": f.id.to_string(),
            "reason": f.reason,
        })).collect::<Vec<_>>(),
        "level": result.level(),
        "message": result.message(),
    })
}

// -------------------------
// Catalog
// -------------------------

fn category_summary_json(c: &Category) -> Value {
    json!({
        "id": c.id.to_string(),
        "name": c.name,
        "slug": c.slug,
    })
}

pub fn category_to_json(c: &Category) -> Value {
    json!({
        "id": c.id.to_string(),
        "name": c.name,
        "slug": c.slug,
        "parent_id": c.parent_id.map(|p| p.to_string()),
        "icon": c.icon,
        "sort_order": c.sort_order,
        "active": c.active,
        "created_at": c.created_at.to_rfc3339(),
        "updated_at": c.updated_at.to_rfc3339(),
    })
}

pub fn category_node_to_json(node: &CategoryNode) -> Value {
    let mut value = category_to_json(&node.category);
    value["children"] = Value::Array(node.children.iter().map(category_node_to_json).collect());
    value
}

pub fn marketplace_to_json(m: &Marketplace) -> Value {
    json!({
        "id": m.id.to_string(),
        "name": m.name,
        "slug": m.slug,
        "color": m.color,
        "active": m.active,
    })
}

pub fn link_to_json(l: &Link, marketplace: Option<&Marketplace>) -> Value {
    json!({
        "id": l.id.to_string(),
        "product_id": l.product_id.to_string(),
        "marketplace_id": l.marketplace_id.to_string(),
        "marketplace": marketplace.map(marketplace_to_json),
        "store_name": l.store_name,
        "url": l.url,
        "price": l.price,
        "price_formatted": formatted_price(l.price),
        "rating": l.rating,
        "sold_count": l.sold_count,
        "active": l.active,
        "clicks": l.clicks,
    })
}

// -------------------------
// Accounts & audit
// -------------------------

/// Password hashes never leave the process.
pub fn admin_to_json(a: &Admin) -> Value {
    json!({
        "id": a.id.to_string(),
        "username": a.username,
        "email": a.email,
        "name": a.name,
        "role": a.role.as_str(),
        "active": a.active,
        "last_login_at": a.last_login_at.map(|d| d.to_rfc3339()),
        "created_at": a.created_at.to_rfc3339(),
    })
}

pub fn role_to_json(r: &RoleDefinition) -> Value {
    json!({
        "role": r.role.as_str(),
        "label": r.label,
        "permissions": r.permissions.iter().map(|p| p.as_str()).collect::<Vec<_>>(),
        "editable": !r.role.is_super_admin(),
    })
}

pub fn audit_log_to_json(log: &AuditLog) -> Value {
    json!({
        "id": log.id.to_string(),
        "admin_id": log.admin_id.map(|a| a.to_string()),
        "action": log.action,
        "entity_type": log.entity_type,
        "entity_id": log.entity_id,
        "old_values": log.old_values,
        "new_values": log.new_values,
        "created_at": log.created_at.to_rfc3339(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use pricelens_catalog::CreateProductRequest;

    fn product() -> Product {
        let request = CreateProductRequest {
            name: "Galaxy Tab".to_string(),
            slug: None,
            description: Some("10 inch".to_string()),
            price: Price::new(4_500_000).unwrap(),
            category_id: None,
            image: None,
        };
        Product::create(&request, "galaxy-tab".to_string(), Utc::now())
    }

    #[test]
    fn public_view_hides_workflow_fields() {
        let view = to_public_json(&product());
        for hidden in ["status", "verified_by", "deleted_at", "is_trashed"] {
            assert!(view.get(hidden).is_none(), "{hidden} leaked");
        }
        assert_eq!(view["price_formatted"], "Rp 4.500.000");
    }

    #[test]
    fn admin_view_carries_status() {
        let view = to_admin_json(&product());
        assert_eq!(view["status"], "draft");
        assert_eq!(view["is_trashed"], false);
    }

    #[test]
    fn detail_view_adds_offers() {
        let view = to_detail_json(&product(), None, &[], None);
        assert!(view["links"].as_array().unwrap().is_empty());
        assert!(view["category"].is_null());
        assert!(view["lowest_price"].is_null());
    }

    #[test]
    fn form_pairs_collect_repeated_keys() {
        let raw = form_to_raw(vec![
            ("action".into(), "publish".into()),
            ("ids[]".into(), "a".into()),
            ("ids[]".into(), "b".into()),
            ("tag".into(), "x".into()),
            ("tag".into(), "y".into()),
        ]);
        assert_eq!(raw["action"], "publish");
        assert_eq!(raw["ids"], json!(["a", "b"]));
        assert_eq!(raw["tag"], json!(["x", "y"]));
    }
}
