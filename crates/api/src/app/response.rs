//! JSON envelope shared by every API response: `{status, message, data, meta}`.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use serde_json::Value;

use pricelens_core::{Page, PageMeta};

#[derive(Debug, Serialize)]
pub struct Envelope<T: Serialize> {
    pub status: &'static str,
    pub message: Option<String>,
    pub data: T,
    pub meta: Option<PageMeta>,
}

pub fn success<T: Serialize>(data: T) -> Response {
    respond(StatusCode::OK, None, data, None)
}

pub fn created<T: Serialize>(message: impl Into<String>, data: T) -> Response {
    respond(StatusCode::CREATED, Some(message.into()), data, None)
}

pub fn with_message<T: Serialize>(message: impl Into<String>, data: T) -> Response {
    respond(StatusCode::OK, Some(message.into()), data, None)
}

pub fn paginated(page: Page<Value>) -> Response {
    respond(StatusCode::OK, None, page.items, Some(page.meta))
}

fn respond<T: Serialize>(status: StatusCode, message: Option<String>, data: T, meta: Option<PageMeta>) -> Response {
    let envelope = Envelope {
        status: "success",
        message,
        data,
        meta,
    };
    (status, Json(envelope)).into_response()
}
