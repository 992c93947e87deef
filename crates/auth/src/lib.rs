//! `pricelens-auth` — back-office authentication/authorization boundary.
//!
//! This crate is intentionally decoupled from HTTP and storage.

pub mod accounts;
pub mod admin;
pub mod authorize;
pub mod claims;
pub mod jwt;
pub mod password;
pub mod permissions;
pub mod principal;
pub mod repository;
pub mod roles;

pub use accounts::{AccountService, AuthError, LoginOutcome, RolePermissionsRequest};
pub use admin::{Admin, CreateAdminRequest, UpdateAdminRequest};
pub use authorize::{authorize, authorize_all, AuthzError};
pub use claims::{JwtClaims, TokenValidationError, validate_claims};
pub use jwt::{Hs256JwtIssuer, Hs256JwtValidator, JwtError, JwtValidator};
pub use password::{hash_password, verify_password, PasswordError};
pub use permissions::Permission;
pub use principal::Principal;
pub use repository::{AdminRepository, RoleRepository};
pub use roles::{Role, RoleDefinition};
