use serde::Serialize;

use pricelens_core::AdminId;

use crate::{Permission, Role, RoleDefinition};

/// A fully resolved principal for authorization decisions.
///
/// Built by the API from verified token claims plus the current role policy,
/// so permission edits take effect without re-issuing tokens.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Principal {
    pub admin_id: AdminId,
    pub username: String,
    pub role: Role,
    pub permissions: Vec<Permission>,
}

impl Principal {
    pub fn new(admin_id: AdminId, username: impl Into<String>, role: Role) -> Self {
        Self {
            admin_id,
            username: username.into(),
            role,
            permissions: Vec::new(),
        }
    }

    /// Attach the permissions granted by `definition` (ignored if it names another role).
    pub fn with_definition(mut self, definition: Option<&RoleDefinition>) -> Self {
        self.permissions = match definition {
            Some(def) if def.role == self.role => def.permissions.clone(),
            _ => Vec::new(),
        };
        self
    }

    pub fn has_wildcard(&self) -> bool {
        self.permissions.iter().any(Permission::is_wildcard)
    }
}
