//! Supporting catalog services (everything except the product façade).

mod category;
mod link;
mod marketplace;

pub use category::CategoryService;
pub use link::LinkService;
pub use marketplace::MarketplaceService;
