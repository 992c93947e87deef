//! Storage ports for accounts and the role policy.

use pricelens_core::{AdminId, DomainResult};

use crate::{Admin, Role, RoleDefinition};

pub trait AdminRepository: Send + Sync {
    fn insert(&self, admin: Admin) -> DomainResult<Admin>;
    fn find(&self, id: AdminId) -> DomainResult<Option<Admin>>;
    /// Lookup by username or email, case-insensitive.
    fn find_by_login(&self, login: &str) -> DomainResult<Option<Admin>>;
    fn username_taken(&self, username: &str) -> DomainResult<bool>;
    fn email_taken(&self, email: &str, except: Option<AdminId>) -> DomainResult<bool>;
    fn all(&self) -> DomainResult<Vec<Admin>>;
    fn save(&self, admin: Admin) -> DomainResult<()>;
}

pub trait RoleRepository: Send + Sync {
    fn all(&self) -> DomainResult<Vec<RoleDefinition>>;
    fn find(&self, role: &Role) -> DomainResult<Option<RoleDefinition>>;
    fn save(&self, definition: RoleDefinition) -> DomainResult<()>;
}
