use axum::{
    routing::{get, post},
    Router,
};

pub mod audit;
pub mod auth;
pub mod categories;
pub mod common;
pub mod htmx;
pub mod marketplaces;
pub mod products;
pub mod storefront;
pub mod system;
pub mod users;

/// Endpoints reachable without a token.
pub fn public_router() -> Router {
    Router::new()
        .route("/health", get(system::health))
        .route("/api/auth/login", post(auth::login))
        .nest("/api", storefront::router())
        .nest("/htmx", htmx::public_router())
}

/// Endpoints behind the bearer-token middleware.
pub fn protected_router() -> Router {
    Router::new()
        .route("/api/auth/logout", post(auth::logout))
        .route("/api/auth/me", get(auth::me))
        .route("/api/dashboard/stats", get(system::dashboard_stats))
        .route("/api/dashboard/health", get(system::dashboard_health))
        .nest("/admin/products", products::router())
        .nest("/admin/categories", categories::router())
        .nest("/admin/marketplaces", marketplaces::router())
        .nest("/admin/users", users::router())
        .nest("/admin/roles", users::roles_router())
        .nest("/admin/audit-logs", audit::router())
        .nest("/htmx/admin", htmx::admin_router())
}
