//! Process configuration read from the environment (and `.env` when present).

use std::net::SocketAddr;

const DEV_JWT_SECRET: &str = "dev-secret";
const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8080";
const DEFAULT_JWT_TTL_MINUTES: i64 = 120;

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum AppEnv {
    Development,
    Production,
}

impl AppEnv {
    fn parse(value: Option<&str>) -> Self {
        match value.map(str::trim) {
            Some(v) if v.eq_ignore_ascii_case("production") => AppEnv::Production,
            _ => AppEnv::Development,
        }
    }
}

/// Credentials for the super-admin created on a fresh store.
#[derive(Clone, PartialEq, Eq)]
pub struct BootstrapAdmin {
    pub username: String,
    pub email: String,
    pub password: String,
}

impl core::fmt::Debug for BootstrapAdmin {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("BootstrapAdmin")
            .field("username", &self.username)
            .field("email", &self.email)
            .finish_non_exhaustive()
    }
}

#[derive(Clone)]
pub struct ApiConfig {
    pub bind_addr: SocketAddr,
    pub jwt_secret: String,
    pub jwt_ttl_minutes: i64,
    pub env: AppEnv,
    pub admin: BootstrapAdmin,
}

impl core::fmt::Debug for ApiConfig {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("ApiConfig")
            .field("bind_addr", &self.bind_addr)
            .field("jwt_ttl_minutes", &self.jwt_ttl_minutes)
            .field("env", &self.env)
            .field("admin", &self.admin)
            .finish_non_exhaustive()
    }
}

impl ApiConfig {
    /// Load `.env` (if any), then read the process environment.
    pub fn from_env() -> Self {
        _ = dotenvy::dotenv();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary key lookup. Missing or invalid values fall back
    /// to development defaults with a warning.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let bind_addr = match get("BIND_ADDR") {
            Some(raw) => raw.trim().parse().unwrap_or_else(|_| {
                tracing::warn!(value = %raw, "invalid BIND_ADDR; using {DEFAULT_BIND_ADDR}");
                default_bind_addr()
            }),
            None => default_bind_addr(),
        };

        let jwt_secret = get("JWT_SECRET").unwrap_or_else(|| {
            tracing::warn!("JWT_SECRET not set; using insecure dev default");
            DEV_JWT_SECRET.to_string()
        });

        let jwt_ttl_minutes = match get("JWT_TTL_MINUTES") {
            Some(raw) => match raw.trim().parse::<i64>() {
                Ok(minutes) if minutes > 0 => minutes,
                _ => {
                    tracing::warn!(value = %raw, "invalid JWT_TTL_MINUTES; using {DEFAULT_JWT_TTL_MINUTES}");
                    DEFAULT_JWT_TTL_MINUTES
                }
            },
            None => DEFAULT_JWT_TTL_MINUTES,
        };

        let env = AppEnv::parse(get("APP_ENV").as_deref());

        let admin = BootstrapAdmin {
            username: get("ADMIN_USERNAME").unwrap_or_else(|| "admin".to_string()),
            email: get("ADMIN_EMAIL").unwrap_or_else(|| "admin@pricelens.local".to_string()),
            password: get("ADMIN_PASSWORD").unwrap_or_else(|| {
                tracing::warn!("ADMIN_PASSWORD not set; seeding super-admin with dev password");
                "admin12345".to_string()
            }),
        };

        Self {
            bind_addr,
            jwt_secret,
            jwt_ttl_minutes,
            env,
            admin,
        }
    }

    pub fn is_production(&self) -> bool {
        self.env == AppEnv::Production
    }

    /// Development defaults with the given signing secret.
    pub fn for_secret(jwt_secret: impl Into<String>) -> Self {
        let mut config = Self::from_lookup(|_| None);
        config.jwt_secret = jwt_secret.into();
        config
    }
}

fn default_bind_addr() -> SocketAddr {
    SocketAddr::from(([0, 0, 0, 0], 8080))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config(pairs: &[(&str, &str)]) -> ApiConfig {
        let env: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        ApiConfig::from_lookup(|key| env.get(key).cloned())
    }

    #[test]
    fn defaults_apply_when_unset() {
        let c = config(&[]);
        assert_eq!(c.bind_addr.to_string(), DEFAULT_BIND_ADDR);
        assert_eq!(c.jwt_secret, DEV_JWT_SECRET);
        assert_eq!(c.jwt_ttl_minutes, DEFAULT_JWT_TTL_MINUTES);
        assert!(!c.is_production());
        assert_eq!(c.admin.username, "admin");
    }

    #[test]
    fn invalid_numbers_fall_back() {
        let c = config(&[("JWT_TTL_MINUTES", "-5"), ("BIND_ADDR", "nowhere")]);
        assert_eq!(c.jwt_ttl_minutes, DEFAULT_JWT_TTL_MINUTES);
        assert_eq!(c.bind_addr, default_bind_addr());
    }

    #[test]
    fn reads_supplied_values() {
        let c = config(&[
            ("BIND_ADDR", "127.0.0.1:9000"),
            ("JWT_SECRET", "s3cret"),
            ("JWT_TTL_MINUTES", "15"),
            ("APP_ENV", "Production"),
            ("ADMIN_USERNAME", "root"),
        ]);
        assert_eq!(c.bind_addr.port(), 9000);
        assert_eq!(c.jwt_secret, "s3cret");
        assert_eq!(c.jwt_ttl_minutes, 15);
        assert!(c.is_production());
        assert_eq!(c.admin.username, "root");
    }

    #[test]
    fn debug_output_hides_secrets() {
        let c = config(&[("JWT_SECRET", "s3cret"), ("ADMIN_PASSWORD", "hunter2hunter2")]);
        let rendered = format!("{c:?}");
        assert!(!rendered.contains("s3cret"));
        assert!(!rendered.contains("hunter2"));
    }
}
