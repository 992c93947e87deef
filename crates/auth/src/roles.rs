use std::borrow::Cow;

use serde::{Deserialize, Serialize};

use crate::permissions::{self, Permission};

/// Role identifier used for RBAC.
///
/// Roles are opaque strings at this layer; what a role grants is described
/// by its [`RoleDefinition`], which the policy store owns.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Role(Cow<'static, str>);

impl Role {
    pub fn new(name: impl Into<Cow<'static, str>>) -> Self {
        Self(name.into())
    }

    pub const fn from_static(name: &'static str) -> Self {
        Self(Cow::Borrowed(name))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The built-in role whose grants can never be edited.
    pub fn is_super_admin(&self) -> bool {
        self.as_str() == SUPER_ADMIN.as_str()
    }
}

impl core::fmt::Display for Role {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.0)
    }
}

pub const SUPER_ADMIN: Role = Role::from_static("super_admin");
pub const ADMIN: Role = Role::from_static("admin");
pub const EDITOR: Role = Role::from_static("editor");
pub const VIEWER: Role = Role::from_static("viewer");

/// A role together with the permissions it grants.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoleDefinition {
    pub role: Role,
    pub label: String,
    pub permissions: Vec<Permission>,
}

impl RoleDefinition {
    pub fn new(role: Role, label: impl Into<String>, permissions: Vec<Permission>) -> Self {
        let mut permissions = permissions;
        permissions.sort();
        permissions.dedup();
        Self {
            role,
            label: label.into(),
            permissions,
        }
    }

    pub fn grants(&self, required: &Permission) -> bool {
        self.permissions
            .iter()
            .any(|p| p.is_wildcard() || p == required)
    }

    /// Built-in roles seeded on a fresh install.
    pub fn defaults() -> Vec<RoleDefinition> {
        use permissions::*;

        vec![
            RoleDefinition::new(SUPER_ADMIN, "Super Admin", vec![WILDCARD]),
            RoleDefinition::new(
                ADMIN,
                "Administrator",
                vec![
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
                    AUDIT_VIEW,
                ],
            ),
            RoleDefinition::new(
                EDITOR,
                "Editor",
                vec![
                    DASHBOARD_VIEW,
                    PRODUCTS_VIEW,
                    PRODUCTS_CREATE,
                    PRODUCTS_UPDATE,
                    LINKS_MANAGE,
                ],
            ),
            RoleDefinition::new(VIEWER, "Viewer", vec![DASHBOARD_VIEW, PRODUCTS_VIEW]),
        ]
    }
}
