//! Back-office administrator accounts.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use pricelens_core::input::check_length;
use pricelens_core::{AdminId, DomainResult, Entity, FieldErrors, Input, RawInput};

use crate::Role;

/// An administrator able to sign in to the back office.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Admin {
    pub id: AdminId,
    pub username: String,
    pub email: String,
    pub name: String,
    pub password_hash: String,
    pub role: Role,
    pub active: bool,
    pub last_login_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Admin {
    pub fn new(request: &CreateAdminRequest, password_hash: String, now: DateTime<Utc>) -> Self {
        Self {
            id: AdminId::new(),
            username: request.username.clone(),
            email: request.email.clone(),
            name: request.name.clone(),
            password_hash,
            role: request.role.clone(),
            active: true,
            last_login_at: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Whether `login` names this admin (username or email, case-insensitive).
    pub fn matches_login(&self, login: &str) -> bool {
        self.username.eq_ignore_ascii_case(login) || self.email.eq_ignore_ascii_case(login)
    }
}

impl Entity for Admin {
    type Id = AdminId;

    fn id(&self) -> AdminId {
        self.id
    }
}

fn validate_username(errors: &mut FieldErrors, username: &str) {
    check_length(errors, "username", username, 3, 50);
    if !username.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
        errors.add("username", "username may only contain letters, digits and underscores");
    }
}

fn validate_email(errors: &mut FieldErrors, email: &str) {
    let valid = match email.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty()
                && !domain.contains('@')
                && domain.contains('.')
                && !domain.starts_with('.')
                && !domain.ends_with('.')
        }
        None => false,
    };
    if !valid || email.len() > 255 {
        errors.add("email", "email must be a valid email address");
    }
}

fn validate_password(errors: &mut FieldErrors, password: &str) {
    if password.chars().count() < 8 {
        errors.add("password", "password must be at least 8 characters");
    }
}

/// Input contract for creating an admin account.
///
/// Whether `role` exists is checked by the caller against the role store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateAdminRequest {
    pub username: String,
    pub email: String,
    pub name: String,
    pub password: String,
    pub role: Role,
}

impl CreateAdminRequest {
    pub fn from_request(raw: &RawInput) -> DomainResult<Self> {
        let input = Input::new(raw);
        let mut errors = FieldErrors::new();

        let username = input.string("username");
        match &username {
            Some(u) => validate_username(&mut errors, u),
            None => errors.add("username", "username is required"),
        }

        let email = input.string("email").map(|e| e.to_lowercase());
        match &email {
            Some(e) => validate_email(&mut errors, e),
            None => errors.add("email", "email is required"),
        }

        let name = input.string("name");
        match &name {
            Some(n) => check_length(&mut errors, "name", n, 2, 100),
            None => errors.add("name", "name is required"),
        }

        // Passwords are not trimmed.
        let password = raw
            .get("password")
            .and_then(|v| v.as_str())
            .map(str::to_string);
        match &password {
            Some(p) => validate_password(&mut errors, p),
            None => errors.add("password", "password is required"),
        }

        let role = input.string("role");
        if role.is_none() {
            errors.add("role", "role is required");
        }

        errors.into_result()?;

        Ok(Self {
            username: username.unwrap_or_default(),
            email: email.unwrap_or_default(),
            name: name.unwrap_or_default(),
            password: password.unwrap_or_default(),
            role: Role::new(role.unwrap_or_default()),
        })
    }
}

/// Partial update of an admin account; only supplied fields change.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UpdateAdminRequest {
    pub email: Option<String>,
    pub name: Option<String>,
    pub password: Option<String>,
    pub role: Option<Role>,
    pub active: Option<bool>,
}

impl UpdateAdminRequest {
    pub fn from_request(raw: &RawInput) -> DomainResult<Self> {
        let input = Input::new(raw);
        let mut errors = FieldErrors::new();

        let email = input.string("email").map(|e| e.to_lowercase());
        if let Some(e) = &email {
            validate_email(&mut errors, e);
        }

        let name = input.string("name");
        if let Some(n) = &name {
            check_length(&mut errors, "name", n, 2, 100);
        }

        let password = raw
            .get("password")
            .and_then(|v| v.as_str())
            .filter(|p| !p.is_empty())
            .map(str::to_string);
        if let Some(p) = &password {
            validate_password(&mut errors, p);
        }

        let role = input.string("role").map(Role::new);
        let active = input.bool("active", &mut errors);

        errors.into_result()?;

        Ok(Self {
            email,
            name,
            password,
            role,
            active,
        })
    }

    pub fn is_empty(&self) -> bool {
        self.email.is_none()
            && self.name.is_none()
            && self.password.is_none()
            && self.role.is_none()
            && self.active.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{json, Value};

    fn raw(value: Value) -> RawInput {
        value.as_object().cloned().unwrap()
    }

    #[test]
    fn create_admin_accepts_valid_input() {
        let req = CreateAdminRequest::from_request(&raw(json!({
            "username": "budi_s",
            "email": "Budi@Example.COM",
            "name": "Budi Santoso",
            "password": "rahasia123",
            "role": "editor",
        })))
        .unwrap();

        assert_eq!(req.email, "budi@example.com");
        assert_eq!(req.role.as_str(), "editor");
    }

    #[test]
    fn create_admin_reports_every_bad_field() {
        let err = CreateAdminRequest::from_request(&raw(json!({
            "username": "a b",
            "email": "nope",
            "password": "short",
        })))
        .unwrap_err();

        let fields = err.field_errors().unwrap();
        for field in ["username", "email", "name", "password", "role"] {
            assert!(fields.contains(field), "expected error for {field}");
        }
    }

    #[test]
    fn update_admin_only_carries_supplied_fields() {
        let req = UpdateAdminRequest::from_request(&raw(json!({"active": "0"}))).unwrap();
        assert_eq!(req.active, Some(false));
        assert!(req.email.is_none() && req.role.is_none());
        assert!(!req.is_empty());

        assert!(UpdateAdminRequest::from_request(&raw(json!({}))).unwrap().is_empty());
    }

    #[test]
    fn login_matches_username_or_email() {
        let req = CreateAdminRequest {
            username: "siti".into(),
            email: "siti@example.com".into(),
            name: "Siti".into(),
            password: "password1".into(),
            role: crate::roles::VIEWER,
        };
        let admin = Admin::new(&req, "hash".into(), Utc::now());
        assert!(admin.matches_login("SITI"));
        assert!(admin.matches_login("siti@example.com"));
        assert!(!admin.matches_login("other"));
    }
}
