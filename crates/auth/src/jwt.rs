//! HS256 token issuing and verification.

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use thiserror::Error;

use pricelens_core::AdminId;

use crate::{JwtClaims, Role, TokenValidationError, validate_claims};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum JwtError {
    #[error("malformed or badly signed token: {0}")]
    Decode(String),

    #[error("failed to sign token: {0}")]
    Encode(String),

    #[error(transparent)]
    Claims(#[from] TokenValidationError),
}

/// Verifies a bearer token and returns its claims.
pub trait JwtValidator: Send + Sync {
    fn validate(&self, token: &str, now: DateTime<Utc>) -> Result<JwtClaims, JwtError>;
}

/// Shared-secret (HS256) validator.
///
/// Expiry is checked by [`validate_claims`] against our own timestamp claims
/// rather than the registered `exp` claim.
pub struct Hs256JwtValidator {
    key: DecodingKey,
    validation: Validation,
}

impl Hs256JwtValidator {
    pub fn new(secret: impl AsRef<[u8]>) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.required_spec_claims.clear();
        validation.validate_exp = false;
        Self {
            key: DecodingKey::from_secret(secret.as_ref()),
            validation,
        }
    }
}

impl core::fmt::Debug for Hs256JwtValidator {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Hs256JwtValidator").finish_non_exhaustive()
    }
}

impl JwtValidator for Hs256JwtValidator {
    fn validate(&self, token: &str, now: DateTime<Utc>) -> Result<JwtClaims, JwtError> {
        let data = decode::<JwtClaims>(token, &self.key, &self.validation)
            .map_err(|e| JwtError::Decode(e.to_string()))?;
        validate_claims(&data.claims, now)?;
        Ok(data.claims)
    }
}

/// Shared-secret (HS256) token issuer with a fixed lifetime.
pub struct Hs256JwtIssuer {
    key: EncodingKey,
    ttl: Duration,
}

impl Hs256JwtIssuer {
    pub fn new(secret: impl AsRef<[u8]>, ttl: Duration) -> Self {
        Self {
            key: EncodingKey::from_secret(secret.as_ref()),
            ttl,
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    pub fn issue(
        &self,
        admin_id: AdminId,
        username: &str,
        role: Role,
        now: DateTime<Utc>,
    ) -> Result<(String, JwtClaims), JwtError> {
        let claims = JwtClaims {
            sub: admin_id,
            username: username.to_string(),
            role,
            issued_at: now,
            expires_at: now + self.ttl,
        };
        let token = encode(&Header::new(Algorithm::HS256), &claims, &self.key)
            .map_err(|e| JwtError::Encode(e.to_string()))?;
        Ok((token, claims))
    }
}

impl core::fmt::Debug for Hs256JwtIssuer {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Hs256JwtIssuer")
            .field("ttl", &self.ttl)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::roles::EDITOR;

    #[test]
    fn issued_token_validates_with_same_secret() {
        let issuer = Hs256JwtIssuer::new("secret", Duration::minutes(30));
        let validator = Hs256JwtValidator::new("secret");
        let now = Utc::now();

        let admin = AdminId::new();
        let (token, issued) = issuer.issue(admin, "editor1", EDITOR, now).unwrap();
        let claims = validator.validate(&token, now).unwrap();

        assert_eq!(claims, issued);
        assert_eq!(claims.sub, admin);
        assert_eq!(claims.role, EDITOR);
    }

    #[test]
    fn wrong_secret_is_rejected() {
        let issuer = Hs256JwtIssuer::new("secret", Duration::minutes(30));
        let validator = Hs256JwtValidator::new("other");
        let now = Utc::now();

        let (token, _) = issuer.issue(AdminId::new(), "x", EDITOR, now).unwrap();
        assert!(matches!(validator.validate(&token, now), Err(JwtError::Decode(_))));
    }

    #[test]
    fn expired_token_is_rejected() {
        let issuer = Hs256JwtIssuer::new("secret", Duration::minutes(1));
        let validator = Hs256JwtValidator::new("secret");
        let now = Utc::now();

        let (token, _) = issuer.issue(AdminId::new(), "x", EDITOR, now).unwrap();
        let later = now + Duration::minutes(2);
        assert_eq!(
            validator.validate(&token, later),
            Err(JwtError::Claims(TokenValidationError::Expired))
        );
    }
}
