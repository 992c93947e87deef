use std::borrow::Cow;

use serde::{Deserialize, Serialize};

/// Permission identifier.
///
/// Permissions are modeled as opaque strings (e.g. "products.publish").
/// The wildcard permission `"*"` grants everything; only `super_admin` holds it
/// by default.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Permission(Cow<'static, str>);

impl Permission {
    pub fn new(name: impl Into<Cow<'static, str>>) -> Self {
        Self(name.into())
    }

    pub const fn from_static(name: &'static str) -> Self {
        Self(Cow::Borrowed(name))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_wildcard(&self) -> bool {
        self.as_str() == "*"
    }

    /// Whether `name` is a permission this system knows about.
    pub fn is_known(name: &str) -> bool {
        name == "*" || ALL.iter().any(|p| p.as_str() == name)
    }
}

impl core::fmt::Display for Permission {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.0)
    }
}

pub const WILDCARD: Permission = Permission::from_static("*");

pub const DASHBOARD_VIEW: Permission = Permission::from_static("dashboard.view");

pub const PRODUCTS_VIEW: Permission = Permission::from_static("products.view");
pub const PRODUCTS_CREATE: Permission = Permission::from_static("products.create");
pub const PRODUCTS_UPDATE: Permission = Permission::from_static("products.update");
pub const PRODUCTS_DELETE: Permission = Permission::from_static("products.delete");
pub const PRODUCTS_PUBLISH: Permission = Permission::from_static("products.publish");
pub const PRODUCTS_VERIFY: Permission = Permission::from_static("products.verify");
pub const PRODUCTS_BULK: Permission = Permission::from_static("products.bulk");

pub const CATEGORIES_MANAGE: Permission = Permission::from_static("categories.manage");
pub const LINKS_MANAGE: Permission = Permission::from_static("links.manage");
pub const MARKETPLACES_MANAGE: Permission = Permission::from_static("marketplaces.manage");

pub const USERS_MANAGE: Permission = Permission::from_static("users.manage");
pub const ROLES_MANAGE: Permission = Permission::from_static("roles.manage");
pub const AUDIT_VIEW: Permission = Permission::from_static("audit.view");

/// Every concrete permission (the wildcard excluded).
pub const ALL: &[Permission] = &[
    DASHBOARD_VIEW,
    PRODUCTS_VIEW,
    PRODUCTS_CREATE,
    PRODUCTS_UPDATE,
    PRODUCTS_DELETE,
    PRODUCTS_PUBLISH,
    PRODUCTS_VERIFY,
    PRODUCTS_BULK,
    CATEGORIES_MANAGE,
    LINKS_MANAGE,
    MARKETPLACES_MANAGE,
    USERS_MANAGE,
    ROLES_MANAGE,
    AUDIT_VIEW,
];
