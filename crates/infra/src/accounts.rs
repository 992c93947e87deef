use std::collections::BTreeMap;
use std::sync::RwLock;

use pricelens_auth::{Admin, AdminRepository, Role, RoleDefinition, RoleRepository};
use pricelens_core::{AdminId, DomainError, DomainResult};

use crate::store::InMemoryStore;

#[derive(Debug)]
pub struct InMemoryAdminRepository {
    store: InMemoryStore<Admin>,
}

impl InMemoryAdminRepository {
    pub fn new() -> Self {
        Self {
            store: InMemoryStore::new("admin"),
        }
    }
}

impl Default for InMemoryAdminRepository {
    fn default() -> Self {
        Self::new()
    }
}

impl AdminRepository for InMemoryAdminRepository {
    fn insert(&self, admin: Admin) -> DomainResult<Admin> {
        self.store.insert_unique(
            admin,
            |a, b| {
                a.username.eq_ignore_ascii_case(&b.username) || a.email.eq_ignore_ascii_case(&b.email)
            },
            "username or email is already registered",
        )
    }

    fn find(&self, id: AdminId) -> DomainResult<Option<Admin>> {
        self.store.get(id)
    }

    fn find_by_login(&self, login: &str) -> DomainResult<Option<Admin>> {
        self.store.find(|a| a.matches_login(login))
    }

    fn username_taken(&self, username: &str) -> DomainResult<bool> {
        self.store.any(|a| a.username.eq_ignore_ascii_case(username))
    }

    fn email_taken(&self, email: &str, except: Option<AdminId>) -> DomainResult<bool> {
        self.store
            .any(|a| a.email.eq_ignore_ascii_case(email) && Some(a.id) != except)
    }

    fn all(&self) -> DomainResult<Vec<Admin>> {
        self.store.list()
    }

    fn save(&self, admin: Admin) -> DomainResult<()> {
        self.store.replace(admin)
    }
}

/// Role policy keyed by role name.
#[derive(Debug, Default)]
pub struct InMemoryRoleRepository {
    inner: RwLock<BTreeMap<Role, RoleDefinition>>,
}

impl InMemoryRoleRepository {
    pub fn new() -> Self {
        Self::default()
    }

    fn poisoned() -> DomainError {
        DomainError::storage("role store lock poisoned")
    }
}

impl RoleRepository for InMemoryRoleRepository {
    fn all(&self) -> DomainResult<Vec<RoleDefinition>> {
        let map = self.inner.read().map_err(|_| Self::poisoned())?;
        Ok(map.values().cloned().collect())
    }

    fn find(&self, role: &Role) -> DomainResult<Option<RoleDefinition>> {
        let map = self.inner.read().map_err(|_| Self::poisoned())?;
        Ok(map.get(role).cloned())
    }

    fn save(&self, definition: RoleDefinition) -> DomainResult<()> {
        let mut map = self.inner.write().map_err(|_| Self::poisoned())?;
        map.insert(definition.role.clone(), definition);
        Ok(())
    }
}
