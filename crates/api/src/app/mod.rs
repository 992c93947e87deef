//! HTTP application wiring.
//!
//! - `services.rs`: in-memory stores, domain services and seeding
//! - `routes/`: handlers, one file per area
//! - `dto.rs`: request bodies and JSON views
//! - `errors.rs` / `response.rs`: the error and success envelopes
//! - `htmx.rs`: HTML fragments and `HX-Trigger` events

use std::sync::Arc;

use axum::{Extension, Router};
use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;

use pricelens_auth::JwtValidator;

use crate::config::ApiConfig;
use crate::middleware;

pub mod dto;
pub mod errors;
pub mod htmx;
pub mod response;
pub mod routes;
pub mod services;

/// Build the full HTTP router (public entrypoint used by `main.rs`).
pub async fn build_app(config: ApiConfig) -> anyhow::Result<Router> {
    errors::set_production(config.is_production());

    let services = Arc::new(services::build_services(&config)?);
    let jwt: Arc<dyn JwtValidator> = services.jwt.clone();
    let auth_state = middleware::AuthState {
        jwt,
        accounts: services.accounts.clone(),
    };

    // Protected routes: require a bearer token for an active admin.
    let protected = routes::protected_router().layer(axum::middleware::from_fn_with_state(
        auth_state,
        middleware::auth_middleware,
    ));

    Ok(Router::new()
        .merge(routes::public_router())
        .merge(protected)
        .layer(Extension(services))
        .layer(ServiceBuilder::new().layer(TraceLayer::new_for_http())))
}
