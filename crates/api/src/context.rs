use pricelens_auth::{Permission, Principal, Role};
use pricelens_core::AdminId;

/// Authenticated admin for the current request.
///
/// Built by the auth middleware from a verified token and the current role
/// policy; present for every protected route.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PrincipalContext {
    principal: Principal,
}

impl PrincipalContext {
    pub fn new(principal: Principal) -> Self {
        Self { principal }
    }

    pub fn admin_id(&self) -> AdminId {
        self.principal.admin_id
    }

    pub fn username(&self) -> &str {
        &self.principal.username
    }

    pub fn role(&self) -> &Role {
        &self.principal.role
    }

    pub fn permissions(&self) -> &[Permission] {
        &self.principal.permissions
    }

    pub fn principal(&self) -> &Principal {
        &self.principal
    }
}
