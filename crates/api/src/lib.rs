//! HTTP API for the PriceLens catalog: storefront JSON, the admin back
//! office and its HTMX fragments.

pub mod app;
pub mod authz;
pub mod config;
pub mod context;
pub mod middleware;
