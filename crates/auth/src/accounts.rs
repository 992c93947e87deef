//! Admin accounts, sign-in and the editable role policy.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use thiserror::Error;

use pricelens_core::{AdminId, DomainError, DomainResult, FieldErrors, Input, RawInput};

use crate::repository::{AdminRepository, RoleRepository};
use crate::{
    hash_password, verify_password, Admin, CreateAdminRequest, Hs256JwtIssuer, JwtClaims,
    JwtError, PasswordError, Permission, Principal, Role, RoleDefinition, UpdateAdminRequest,
};

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("invalid username or password")]
    InvalidCredentials,

    #[error("account is deactivated")]
    Inactive,

    #[error(transparent)]
    Domain(#[from] DomainError),

    #[error(transparent)]
    Password(#[from] PasswordError),

    #[error(transparent)]
    Jwt(#[from] JwtError),
}

/// Successful sign-in.
#[derive(Debug, Clone)]
pub struct LoginOutcome {
    pub admin: Admin,
    pub token: String,
    pub expires_at: DateTime<Utc>,
}

/// Replacement permission set for a role.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RolePermissionsRequest {
    pub permissions: Vec<Permission>,
}

impl RolePermissionsRequest {
    pub fn from_request(raw: &RawInput) -> DomainResult<Self> {
        let input = Input::new(raw);
        let mut errors = FieldErrors::new();
        let mut permissions = Vec::new();

        match input.string_list("permissions") {
            Some(names) => {
                for name in names {
                    if Permission::is_known(&name) {
                        permissions.push(Permission::new(name));
                    } else {
                        errors.add("permissions", format!("unknown permission `{name}`"));
                    }
                }
            }
            None => errors.add("permissions", "permissions is required"),
        }

        errors.into_result()?;
        Ok(Self { permissions })
    }
}

#[derive(Clone)]
pub struct AccountService {
    admins: Arc<dyn AdminRepository>,
    roles: Arc<dyn RoleRepository>,
    issuer: Arc<Hs256JwtIssuer>,
}

impl AccountService {
    pub fn new(
        admins: Arc<dyn AdminRepository>,
        roles: Arc<dyn RoleRepository>,
        issuer: Arc<Hs256JwtIssuer>,
    ) -> Self {
        Self {
            admins,
            roles,
            issuer,
        }
    }

    /// Username or email plus password. Unknown logins and wrong passwords
    /// fail the same way.
    pub fn login(&self, login: &str, password: &str, now: DateTime<Utc>) -> Result<LoginOutcome, AuthError> {
        let mut admin = self
            .admins
            .find_by_login(login.trim())?
            .ok_or(AuthError::InvalidCredentials)?;
        if !verify_password(password, &admin.password_hash)? {
            return Err(AuthError::InvalidCredentials);
        }
        if !admin.active {
            return Err(AuthError::Inactive);
        }

        let (token, claims) = self.issuer.issue(admin.id, &admin.username, admin.role.clone(), now)?;
        admin.last_login_at = Some(now);
        self.admins.save(admin.clone())?;
        tracing::info!(admin_id = %admin.id, username = %admin.username, "admin signed in");

        Ok(LoginOutcome {
            admin,
            token,
            expires_at: claims.expires_at,
        })
    }

    /// Resolve verified token claims into a principal using the current
    /// account state and role policy.
    pub fn principal(&self, claims: &JwtClaims) -> Result<Principal, AuthError> {
        let admin = self
            .admins
            .find(claims.sub)?
            .ok_or(AuthError::InvalidCredentials)?;
        if !admin.active {
            return Err(AuthError::Inactive);
        }
        let definition = self.roles.find(&admin.role)?;
        Ok(Principal::new(admin.id, admin.username, admin.role).with_definition(definition.as_ref()))
    }

    pub fn get_admin(&self, id: AdminId) -> DomainResult<Admin> {
        self.admins.find(id)?.ok_or_else(|| DomainError::not_found("admin"))
    }

    pub fn list_admins(&self) -> DomainResult<Vec<Admin>> {
        let mut admins = self.admins.all()?;
        admins.sort_by(|a, b| a.username.cmp(&b.username));
        Ok(admins)
    }

    fn ensure_role(&self, role: &Role) -> DomainResult<()> {
        if self.roles.find(role)?.is_none() {
            return Err(DomainError::field("role", format!("role `{role}` does not exist")));
        }
        Ok(())
    }

    pub fn create_admin(&self, request: CreateAdminRequest) -> Result<Admin, AuthError> {
        self.ensure_role(&request.role)?;

        let mut errors = FieldErrors::new();
        if self.admins.username_taken(&request.username)? {
            errors.add("username", "username is already taken");
        }
        if self.admins.email_taken(&request.email, None)? {
            errors.add("email", "email is already registered");
        }
        errors.into_result()?;

        let hash = hash_password(&request.password)?;
        let admin = self.admins.insert(Admin::new(&request, hash, Utc::now()))?;
        tracing::info!(admin_id = %admin.id, role = %admin.role, "admin created");
        Ok(admin)
    }

    /// `actor` may not deactivate or demote themselves.
    pub fn update_admin(
        &self,
        id: AdminId,
        request: UpdateAdminRequest,
        actor: AdminId,
    ) -> Result<Admin, AuthError> {
        let mut admin = self.get_admin(id)?;

        if let Some(role) = &request.role {
            self.ensure_role(role)?;
            if id == actor && role != &admin.role {
                return Err(DomainError::conflict("you cannot change your own role").into());
            }
        }
        if request.active == Some(false) && id == actor {
            return Err(DomainError::conflict("you cannot deactivate your own account").into());
        }
        if let Some(email) = &request.email {
            if self.admins.email_taken(email, Some(id))? {
                return Err(DomainError::field("email", "email is already registered").into());
            }
        }

        if let Some(email) = request.email {
            admin.email = email;
        }
        if let Some(name) = request.name {
            admin.name = name;
        }
        if let Some(password) = &request.password {
            admin.password_hash = hash_password(password)?;
        }
        if let Some(role) = request.role {
            admin.role = role;
        }
        if let Some(active) = request.active {
            admin.active = active;
        }
        admin.updated_at = Utc::now();

        self.admins.save(admin.clone())?;
        tracing::info!(admin_id = %id, "admin updated");
        Ok(admin)
    }

    pub fn deactivate_admin(&self, id: AdminId, actor: AdminId) -> Result<Admin, AuthError> {
        let request = UpdateAdminRequest {
            active: Some(false),
            ..UpdateAdminRequest::default()
        };
        self.update_admin(id, request, actor)
    }

    pub fn roles(&self) -> DomainResult<Vec<RoleDefinition>> {
        let mut roles = self.roles.all()?;
        roles.sort_by(|a, b| a.role.cmp(&b.role));
        Ok(roles)
    }

    /// Replace a role's permissions. The super-admin role is fixed.
    pub fn set_role_permissions(
        &self,
        role: &Role,
        request: RolePermissionsRequest,
    ) -> DomainResult<RoleDefinition> {
        if role.is_super_admin() {
            return Err(DomainError::conflict("the super_admin role cannot be edited"));
        }
        if request.permissions.iter().any(Permission::is_wildcard) {
            return Err(DomainError::field("permissions", "only super_admin may hold `*`"));
        }
        let current = self
            .roles
            .find(role)?
            .ok_or_else(|| DomainError::not_found("role"))?;
        let updated = RoleDefinition::new(current.role, current.label, request.permissions);
        self.roles.save(updated.clone())?;
        tracing::info!(role = %role, permissions = updated.permissions.len(), "role permissions replaced");
        Ok(updated)
    }

    /// Insert built-in roles that are missing. Existing definitions are kept.
    pub fn seed_roles(&self) -> DomainResult<usize> {
        let mut inserted = 0;
        for definition in RoleDefinition::defaults() {
            if self.roles.find(&definition.role)?.is_none() {
                self.roles.save(definition)?;
                inserted += 1;
            }
        }
        Ok(inserted)
    }

    /// Create the bootstrap super-admin unless an account with that username
    /// already exists.
    pub fn ensure_super_admin(
        &self,
        username: &str,
        email: &str,
        password: &str,
    ) -> Result<Option<Admin>, AuthError> {
        if self.admins.username_taken(username)? {
            return Ok(None);
        }
        let request = CreateAdminRequest {
            username: username.to_string(),
            email: email.to_lowercase(),
            name: "Super Admin".to_string(),
            password: password.to_string(),
            role: crate::roles::SUPER_ADMIN,
        };
        self.create_admin(request).map(Some)
    }
}
